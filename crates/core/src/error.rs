//! Error types for the Tagbot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error variant.
//!
//! Access denial and unknown tags are *outcomes*, not errors: they are
//! answered with a notice and never show up here.

use thiserror::Error;

/// The top-level error type for all Tagbot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Transport errors ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Tag store errors ---
    #[error("Tag store error: {0}")]
    Tag(#[from] TagError),

    // --- Link preview errors ---
    #[error("Link preview error: {0}")]
    Preview(#[from] PreviewError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// No guild text channel matches the configured bots channel pattern.
    ///
    /// Raised while building an access-denied notice. This is a
    /// configuration fault and must not be folded into a generic denial.
    #[error(
        "Unable to find a channel matching bots channel pattern '{pattern}', try fixing config"
    )]
    BotsChannelUnresolvable { pattern: String },

    // --- Interaction errors ---
    #[error("Unexpected option: {0}")]
    UnexpectedOption(String),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error stems from broken configuration rather than a
    /// single failed request.
    pub fn is_config_fault(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::BotsChannelUnresolvable { .. }
        )
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Interaction response failed: {0}")]
    DeliveryFailed(String),

    #[error("Interaction already acknowledged: {0}")]
    AlreadyAcknowledged(String),

    #[error("Interaction expired: {0}")]
    Expired(String),

    #[error("Transport connection lost: {0}")]
    ConnectionLost(String),
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to load tags from {path}: {reason}")]
    Load { path: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum PreviewError {
    #[error("Link extraction failed: {0}")]
    Extraction(String),

    #[error("Preview fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Preview fetch timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Preview task aborted: {0}")]
    Aborted(String),
}
