//! # Tagbot Core
//!
//! Domain types, collaborator traits, and error definitions for the `/tag`
//! chat command. This crate has **no transport or storage dependencies**;
//! it defines the model that the policy, composer, and adapters implement
//! against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (tag store, fuzzy matcher, link extractor,
//! link previewer, transport) is a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod embed;
pub mod error;
pub mod event;
pub mod interaction;
pub mod matcher;
pub mod preview;
pub mod tag;

// Re-export key types at crate root for ergonomics
pub use embed::{Attachment, Embed, MAX_EMBED_COUNT, RenderedResponse};
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use interaction::{
    AutocompleteQuery, ChannelKind, Choice, GuildChannel, GuildDirectory, InteractionResponder,
    InvocationContext, UserRef,
};
pub use matcher::FuzzyMatcher;
pub use preview::{LinkExtractor, LinkPreview, LinkPreviewer};
pub use tag::{Tag, TagLookup, TagStore};
