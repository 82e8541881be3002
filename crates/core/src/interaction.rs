//! Interaction types and transport traits — the abstraction over chat platforms.
//!
//! An inbound slash command or autocomplete event is turned into an
//! [`InvocationContext`] / [`AutocompleteQuery`] by a transport adapter.
//! Responses go back out through an [`InteractionResponder`], which is bound
//! to exactly one interaction.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embed::RenderedResponse;
use crate::error::TransportError;

/// A user that can be pinged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    /// Platform user ID
    pub id: String,

    /// Display name (informational only)
    #[serde(default)]
    pub name: String,
}

impl UserRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Mention text that pings this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Where a command was invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelKind {
    /// A regular guild text channel
    Standalone,
    /// A thread; access is decided by the channel it hangs off
    Thread { parent_name: String },
}

/// Everything the command needs to know about a single invocation.
///
/// Created fresh per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationContext {
    pub channel_id: String,

    /// Name of the channel (or thread) the command was used in
    pub channel_name: String,

    pub channel_kind: ChannelKind,

    /// Role names held by the invoking member
    #[serde(default)]
    pub invoker_roles: BTreeSet<String>,

    /// The `id` option
    pub requested_id: String,

    /// The optional `reply-to` option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<UserRef>,
}

impl InvocationContext {
    /// Invocation in a standalone channel with no roles and no reply-to.
    pub fn in_channel(
        channel_id: impl Into<String>,
        channel_name: impl Into<String>,
        requested_id: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_name: channel_name.into(),
            channel_kind: ChannelKind::Standalone,
            invoker_roles: BTreeSet::new(),
            requested_id: requested_id.into(),
            reply_to: None,
        }
    }

    /// Invocation inside a thread of the given parent channel.
    pub fn in_thread(
        channel_id: impl Into<String>,
        thread_name: impl Into<String>,
        parent_name: impl Into<String>,
        requested_id: impl Into<String>,
    ) -> Self {
        Self {
            channel_kind: ChannelKind::Thread {
                parent_name: parent_name.into(),
            },
            ..Self::in_channel(channel_id, thread_name, requested_id)
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.invoker_roles.insert(role.into());
        self
    }

    pub fn with_reply_to(mut self, user: UserRef) -> Self {
        self.reply_to = Some(user);
        self
    }

    pub fn is_thread(&self) -> bool {
        matches!(self.channel_kind, ChannelKind::Thread { .. })
    }
}

/// The option currently being typed in an autocomplete interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteQuery {
    /// Name of the focused option
    pub option: String,

    /// What the user has typed so far
    pub value: String,
}

/// A single autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    /// A choice whose label and value are both `id`.
    pub fn same(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            value: id,
        }
    }
}

/// A text channel of the guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildChannel {
    pub id: String,
    pub name: String,
}

impl GuildChannel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Clickable channel reference.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

impl std::fmt::Display for GuildChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mention())
    }
}

/// Read-only view of the guild's channels.
pub trait GuildDirectory: Send + Sync {
    /// All text channels, in guild order.
    fn text_channels(&self) -> Vec<GuildChannel>;
}

/// Response side of a single interaction.
///
/// Implementations handle platform-specific delivery. The command uses
/// either `reply` once, or `defer` once followed by `edit_original` once.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Send the complete response immediately.
    async fn reply(&self, response: RenderedResponse) -> Result<(), TransportError>;

    /// Send a notice only the invoker can see.
    async fn reply_ephemeral(&self, text: &str) -> Result<(), TransportError>;

    /// Acknowledge with an empty placeholder, to be edited later.
    async fn defer(&self) -> Result<(), TransportError>;

    /// Replace the placeholder sent by `defer`.
    async fn edit_original(&self, response: RenderedResponse) -> Result<(), TransportError>;

    /// Answer an autocomplete interaction.
    async fn reply_choices(&self, choices: Vec<Choice>) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_mention_format() {
        let user = UserRef::new("1234", "alice");
        assert_eq!(user.mention(), "<@1234>");
    }

    #[test]
    fn channel_display_is_mention() {
        let channel = GuildChannel::new("42", "bot-commands");
        assert_eq!(channel.to_string(), "<#42>");
    }

    #[test]
    fn thread_context_keeps_parent() {
        let ctx = InvocationContext::in_thread("9", "my question", "questions", "ask")
            .with_role("Member");
        assert!(ctx.is_thread());
        assert_eq!(ctx.channel_name, "my question");
        assert_eq!(
            ctx.channel_kind,
            ChannelKind::Thread {
                parent_name: "questions".into()
            }
        );
        assert!(ctx.invoker_roles.contains("Member"));
    }

    #[test]
    fn choice_label_equals_value() {
        let choice = Choice::same("ask");
        assert_eq!(choice.label, "ask");
        assert_eq!(choice.value, "ask");
    }

    #[test]
    fn channel_kind_serialization() {
        let kind = ChannelKind::Thread {
            parent_name: "questions".into(),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"kind\":\"thread\""));
        assert!(json.contains("questions"));
    }
}
