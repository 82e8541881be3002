//! Discord interaction adapter (stub).
//!
//! In production, this would use `serenity` to receive interactions over the
//! gateway and answer them through the interaction webhook. Currently a stub:
//! inbound interactions are injected in-process and outbound responses are
//! forwarded to a channel for inspection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tagbot_config::DiscordConfig;
use tagbot_core::embed::RenderedResponse;
use tagbot_core::error::TransportError;
use tagbot_core::interaction::{
    AutocompleteQuery, Choice, InteractionResponder, InvocationContext,
};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

/// An interaction received from Discord.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundInteraction {
    SlashCommand {
        interaction_id: String,
        context: InvocationContext,
    },
    Autocomplete {
        interaction_id: String,
        query: AutocompleteQuery,
    },
}

impl InboundInteraction {
    pub fn interaction_id(&self) -> &str {
        match self {
            Self::SlashCommand { interaction_id, .. } | Self::Autocomplete { interaction_id, .. } => {
                interaction_id
            }
        }
    }
}

/// A response sent back to Discord.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundAction {
    Reply {
        interaction_id: String,
        response: RenderedResponse,
    },
    Ephemeral {
        interaction_id: String,
        text: String,
    },
    Defer {
        interaction_id: String,
    },
    EditOriginal {
        interaction_id: String,
        response: RenderedResponse,
    },
    Choices {
        interaction_id: String,
        choices: Vec<Choice>,
    },
}

/// Gateway connection (stub).
pub struct DiscordGateway {
    config: DiscordConfig,
    inject_tx: Mutex<Option<mpsc::Sender<InboundInteraction>>>,
}

impl DiscordGateway {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            inject_tx: Mutex::new(None),
        }
    }

    /// Start receiving interactions.
    pub async fn start(&self) -> Result<mpsc::Receiver<InboundInteraction>, TransportError> {
        info!("Discord gateway starting (stub mode)");
        let (tx, rx) = mpsc::channel(64);
        *self.inject_tx.lock().await = Some(tx);
        Ok(rx)
    }

    /// Inject an interaction as if it came from Discord (for testing).
    pub async fn inject(&self, interaction: InboundInteraction) -> Result<(), TransportError> {
        let guard = self.inject_tx.lock().await;
        match guard.as_ref() {
            Some(tx) => tx
                .send(interaction)
                .await
                .map_err(|_| TransportError::ConnectionLost("Interaction channel closed".into())),
            None => Err(TransportError::ConnectionLost("Gateway not started".into())),
        }
    }

    pub async fn stop(&self) {
        info!("Discord gateway stopping");
        *self.inject_tx.lock().await = None;
    }

    pub fn health_check(&self) -> bool {
        self.config
            .bot_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AckState {
    Pending,
    Deferred,
    Responded,
}

/// Responder for one Discord interaction.
///
/// Enforces the interaction lifecycle: exactly one initial response
/// (`reply`, ephemeral reply, choices, or `defer`), and edits only after it.
pub struct DiscordInteraction {
    interaction_id: String,
    state: Mutex<AckState>,
    outbound: mpsc::Sender<OutboundAction>,
}

impl DiscordInteraction {
    pub fn new(interaction_id: impl Into<String>, outbound: mpsc::Sender<OutboundAction>) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            state: Mutex::new(AckState::Pending),
            outbound,
        }
    }

    pub fn interaction_id(&self) -> &str {
        &self.interaction_id
    }

    /// Move from `Pending` to `next`, or fail if already acknowledged.
    async fn acknowledge(&self, next: AckState) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        if *state != AckState::Pending {
            return Err(TransportError::AlreadyAcknowledged(self.interaction_id.clone()));
        }
        *state = next;
        Ok(())
    }

    async fn forward(&self, action: OutboundAction) -> Result<(), TransportError> {
        self.outbound
            .send(action)
            .await
            .map_err(|_| TransportError::ConnectionLost("Outbound channel closed".into()))
    }
}

#[async_trait]
impl InteractionResponder for DiscordInteraction {
    async fn reply(&self, response: RenderedResponse) -> Result<(), TransportError> {
        self.acknowledge(AckState::Responded).await?;
        info!(
            interaction = %self.interaction_id,
            embeds = response.embed_count(),
            attachments = response.attachments.len(),
            "Discord reply (stub)"
        );
        self.forward(OutboundAction::Reply {
            interaction_id: self.interaction_id.clone(),
            response,
        })
        .await
    }

    async fn reply_ephemeral(&self, text: &str) -> Result<(), TransportError> {
        self.acknowledge(AckState::Responded).await?;
        info!(interaction = %self.interaction_id, content_len = text.len(), "Discord ephemeral reply (stub)");
        self.forward(OutboundAction::Ephemeral {
            interaction_id: self.interaction_id.clone(),
            text: text.to_string(),
        })
        .await
    }

    async fn defer(&self) -> Result<(), TransportError> {
        self.acknowledge(AckState::Deferred).await?;
        debug!(interaction = %self.interaction_id, "Discord defer (stub)");
        self.forward(OutboundAction::Defer {
            interaction_id: self.interaction_id.clone(),
        })
        .await
    }

    async fn edit_original(&self, response: RenderedResponse) -> Result<(), TransportError> {
        if *self.state.lock().await == AckState::Pending {
            return Err(TransportError::DeliveryFailed(format!(
                "No original response to edit for {}",
                self.interaction_id
            )));
        }
        info!(
            interaction = %self.interaction_id,
            embeds = response.embed_count(),
            attachments = response.attachments.len(),
            "Discord edit original (stub)"
        );
        self.forward(OutboundAction::EditOriginal {
            interaction_id: self.interaction_id.clone(),
            response,
        })
        .await
    }

    async fn reply_choices(&self, choices: Vec<Choice>) -> Result<(), TransportError> {
        self.acknowledge(AckState::Responded).await?;
        debug!(interaction = %self.interaction_id, choices = choices.len(), "Discord autocomplete (stub)");
        self.forward(OutboundAction::Choices {
            interaction_id: self.interaction_id.clone(),
            choices,
        })
        .await
    }
}
