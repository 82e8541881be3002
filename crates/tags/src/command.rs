//! The `/tag` command — gatekeeping, resolution, and delivery wired together.
//!
//! Slash command flow:
//! 1. [`AccessPolicy`] decides whether the invocation is allowed
//! 2. [`TagResolver`] looks the id up
//! 3. [`ResponseComposer`] renders and delivers the tag
//!
//! Denials and unknown ids are answered with an ephemeral notice and end
//! the request. Autocomplete is handled independently.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tagbot_config::AppConfig;
use tagbot_core::embed::RenderedResponse;
use tagbot_core::error::Error;
use tagbot_core::event::{DomainEvent, EventBus};
use tagbot_core::interaction::{
    AutocompleteQuery, GuildDirectory, InteractionResponder, InvocationContext,
};
use tagbot_core::matcher::FuzzyMatcher;
use tagbot_core::preview::{LinkExtractor, LinkPreviewer};
use tagbot_core::tag::{TagLookup, TagStore};
use tagbot_security::AccessPolicy;
use tracing::{debug, error, info};

use crate::composer::{ComposerSettings, Delivery, PendingEdit, ResponseComposer};
use crate::resolver::TagResolver;
use crate::suggest::SuggestionEngine;

pub const COMMAND_NAME: &str = "tag";
pub const ID_OPTION: &str = "id";
pub const REPLY_TO_USER_OPTION: &str = "reply-to";

/// Kind of value a command option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    String,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub required: bool,
    pub autocomplete: bool,
}

/// Registration data for the slash command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// Only usable inside a guild
    pub guild_only: bool,
    pub options: Vec<OptionDefinition>,
}

/// How a slash command invocation ended.
#[derive(Debug)]
pub enum CommandOutcome {
    /// Rejected by the access policy; notice sent
    Denied,
    /// No such tag; notice sent
    UnknownTag { id: String, suggestion: Option<String> },
    /// Tag sent as a single reply
    Replied(RenderedResponse),
    /// Tag acknowledged; previews follow in one edit
    Deferred(PendingEdit),
}

/// Handler for `/tag` slash commands and their autocomplete.
pub struct TagCommand {
    policy: AccessPolicy,
    resolver: TagResolver,
    suggestions: SuggestionEngine,
    composer: ResponseComposer,
    events: Option<Arc<EventBus>>,
}

impl TagCommand {
    pub fn new(
        policy: AccessPolicy,
        resolver: TagResolver,
        suggestions: SuggestionEngine,
        composer: ResponseComposer,
    ) -> Self {
        Self {
            policy,
            resolver,
            suggestions,
            composer,
            events: None,
        }
    }

    /// Build the command from configuration and its collaborators.
    ///
    /// Fails if any configured pattern does not compile.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn TagStore>,
        matcher: Arc<dyn FuzzyMatcher>,
        extractor: Arc<dyn LinkExtractor>,
        previewer: Arc<dyn LinkPreviewer>,
    ) -> Result<Self, Error> {
        Ok(Self::new(
            AccessPolicy::from_config(config)?,
            TagResolver::new(store),
            SuggestionEngine::new(matcher),
            ResponseComposer::new(extractor, previewer, ComposerSettings::from_config(config)),
        ))
    }

    /// Publish outcomes on `bus`.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.composer = self.composer.with_events(Arc::clone(&bus));
        self.events = Some(bus);
        self
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Slash command registration data.
    pub fn definition() -> CommandDefinition {
        CommandDefinition {
            name: COMMAND_NAME,
            description: "Display a tags content",
            guild_only: true,
            options: vec![
                OptionDefinition {
                    name: ID_OPTION,
                    description: "The id of the tag to display",
                    kind: OptionKind::String,
                    required: true,
                    autocomplete: true,
                },
                OptionDefinition {
                    name: REPLY_TO_USER_OPTION,
                    description: "Optionally, the user who you want to reply to",
                    kind: OptionKind::User,
                    required: false,
                    autocomplete: false,
                },
            ],
        }
    }

    /// Handle a `/tag` invocation.
    ///
    /// Errors are reserved for faults: a bots channel that cannot be found
    /// ([`Error::BotsChannelUnresolvable`]), store failures, and transport
    /// failures before the response was handed off.
    pub async fn on_slash_command(
        &self,
        ctx: &InvocationContext,
        guild: &dyn GuildDirectory,
        responder: Arc<dyn InteractionResponder>,
    ) -> Result<CommandOutcome, Error> {
        let requested_at = Utc::now();

        if !self.policy.is_allowed(ctx) {
            let notice = self.policy.denial_notice(guild).inspect_err(|e| {
                error!(error = %e, "Cannot name the bots channel in access notice");
            })?;
            responder.reply_ephemeral(&notice).await?;
            info!(channel = %ctx.channel_name, tag = %ctx.requested_id, "Tag request denied");
            self.publish(DomainEvent::AccessDenied {
                channel_name: ctx.channel_name.clone(),
                requested_id: ctx.requested_id.clone(),
                timestamp: requested_at,
            });
            return Ok(CommandOutcome::Denied);
        }

        let tag = match self.resolver.resolve(&ctx.requested_id).await? {
            TagLookup::Found(tag) => tag,
            TagLookup::NotFound { id } => {
                let known = self.resolver.known_ids().await?;
                let suggestion = self.suggestions.closest(&id, &known);
                responder
                    .reply_ephemeral(&unknown_tag_notice(&id, suggestion.as_deref()))
                    .await?;
                info!(tag = %id, suggestion = ?suggestion, "Unknown tag requested");
                self.publish(DomainEvent::UnknownTagRequested {
                    requested_id: id.clone(),
                    suggestion: suggestion.clone(),
                    timestamp: requested_at,
                });
                return Ok(CommandOutcome::UnknownTag { id, suggestion });
            }
        };

        let composition = self
            .composer
            .compose(&tag, ctx.reply_to.as_ref(), requested_at);
        let link_count = composition.links.len();
        let delivery = self.composer.deliver(composition, responder).await?;
        let deferred = matches!(delivery, Delivery::Deferred(_));

        info!(tag = %tag.id, links = link_count, deferred, "Tag displayed");
        self.publish(DomainEvent::TagDisplayed {
            tag_id: tag.id,
            deferred,
            link_count,
            timestamp: requested_at,
        });

        Ok(match delivery {
            Delivery::Immediate(response) => CommandOutcome::Replied(response),
            Delivery::Deferred(pending) => CommandOutcome::Deferred(pending),
        })
    }

    /// Answer an autocomplete interaction for the `id` option.
    pub async fn on_autocomplete(
        &self,
        query: &AutocompleteQuery,
        responder: &dyn InteractionResponder,
    ) -> Result<(), Error> {
        if query.option != ID_OPTION {
            return Err(Error::UnexpectedOption(format!(
                "Unexpected option, was: {}",
                query.option
            )));
        }

        let known = self.resolver.known_ids().await?;
        let choices = self.suggestions.choices(&query.value, &known);
        debug!(fragment = %query.value, choices = choices.len(), "Autocomplete");
        responder.reply_choices(choices).await?;
        Ok(())
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

/// Ephemeral notice for an id the store does not know.
pub fn unknown_tag_notice(id: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(closest) => {
            format!("Could not find any tag with id `{id}`, did you perhaps mean `{closest}`?")
        }
        None => format!("Could not find any tag with id `{id}`."),
    }
}
