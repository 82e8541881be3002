//! Access policy — where and by whom `/tag` may be invoked.
//!
//! Three name matchers are compiled once from configuration:
//! - the designated bots channel,
//! - the help forum whose threads may use the command,
//! - the tag-manage role that overrides channel restrictions.
//!
//! Matching is full-match: `bots` does not match `bots-archive`.

use regex_lite::Regex;
use tagbot_config::AppConfig;
use tagbot_core::error::Error;
use tagbot_core::interaction::{ChannelKind, GuildChannel, GuildDirectory, InvocationContext};
use tracing::debug;

/// A name predicate compiled from a configuration pattern.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    /// Compile `source` so that it must match an entire name.
    pub fn compile(source: &str) -> Result<Self, Error> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| Error::Config {
            message: format!("Invalid pattern '{source}': {e}"),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// The pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Why an invocation was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// Used directly in the bots channel
    BotsChannel,
    /// Used in a thread of the help forum
    HelpForumThread,
    /// Invoker holds a tag-manage role
    OverrideRole,
}

/// Result of checking an invocation against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed(AllowReason),
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed(_))
    }
}

/// Immutable access policy, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    bots_channel: NamePattern,
    help_forum: NamePattern,
    tag_manage_role: NamePattern,
}

impl AccessPolicy {
    /// Compile the three patterns. Any invalid pattern is a configuration error.
    pub fn new(
        bots_channel_pattern: &str,
        help_forum_pattern: &str,
        tag_manage_role_pattern: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            bots_channel: NamePattern::compile(bots_channel_pattern)?,
            help_forum: NamePattern::compile(help_forum_pattern)?,
            tag_manage_role: NamePattern::compile(tag_manage_role_pattern)?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(
            &config.bots_channel_pattern,
            &config.help_system.help_forum_pattern,
            &config.tag_manage_role_pattern,
        )
    }

    /// Check an invocation.
    ///
    /// Rules:
    /// - Standalone channel → its name must match the bots pattern
    /// - Thread → its *parent's* name must match the help forum pattern
    /// - Any role matching the manage pattern → allowed anywhere
    pub fn check(&self, ctx: &InvocationContext) -> AccessDecision {
        if self.is_allowed_channel(ctx) {
            let reason = if ctx.is_thread() {
                AllowReason::HelpForumThread
            } else {
                AllowReason::BotsChannel
            };
            return AccessDecision::Allowed(reason);
        }

        if self.has_override_role(ctx) {
            return AccessDecision::Allowed(AllowReason::OverrideRole);
        }

        debug!(
            channel = %ctx.channel_name,
            thread = ctx.is_thread(),
            roles = ctx.invoker_roles.len(),
            "Invocation outside allowed channels"
        );
        AccessDecision::Denied
    }

    pub fn is_allowed(&self, ctx: &InvocationContext) -> bool {
        self.check(ctx).is_allowed()
    }

    /// Whether the channel alone permits the invocation.
    pub fn is_allowed_channel(&self, ctx: &InvocationContext) -> bool {
        match &ctx.channel_kind {
            ChannelKind::Standalone => self.bots_channel.matches(&ctx.channel_name),
            ChannelKind::Thread { parent_name } => self.help_forum.matches(parent_name),
        }
    }

    /// Whether the invoker holds a role that bypasses channel restrictions.
    pub fn has_override_role(&self, ctx: &InvocationContext) -> bool {
        ctx.invoker_roles
            .iter()
            .any(|role| self.tag_manage_role.matches(role))
    }

    /// The canonical bots channel: the first guild text channel matching the
    /// bots pattern.
    ///
    /// Fails with [`Error::BotsChannelUnresolvable`] when none matches.
    pub fn bots_channel(&self, guild: &dyn GuildDirectory) -> Result<GuildChannel, Error> {
        guild
            .text_channels()
            .into_iter()
            .find(|channel| self.bots_channel.matches(&channel.name))
            .ok_or_else(|| Error::BotsChannelUnresolvable {
                pattern: self.bots_channel.as_str().to_string(),
            })
    }

    /// The ephemeral notice sent when an invocation is denied.
    pub fn denial_notice(&self, guild: &dyn GuildDirectory) -> Result<String, Error> {
        let bots_channel = self.bots_channel(guild)?;
        Ok(format!(
            "Command can only be used in {bots_channel} channel or help forum, avoid spamming helper forum with usage."
        ))
    }
}
