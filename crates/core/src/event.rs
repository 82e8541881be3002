//! Domain event system — decoupled observation of command handling.
//!
//! Events are published when a `/tag` invocation reaches an outcome.
//! Other components (audit log, metrics, CLI output) can subscribe without
//! the command knowing about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The access policy rejected an invocation
    AccessDenied {
        channel_name: String,
        requested_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A tag id was requested that the store does not know
    UnknownTagRequested {
        requested_id: String,
        suggestion: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A tag was rendered into the conversation
    TagDisplayed {
        tag_id: String,
        deferred: bool,
        link_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The deferred edit carrying link previews was sent
    PreviewsAttached {
        tag_id: String,
        preview_count: usize,
        attachment_count: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
/// Components can subscribe to receive all events and filter for what they care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
