//! The `/tag` command for Tagbot.
//!
//! Renders a stored, named snippet of text back into a conversation:
//! - **Store** — in-memory tag store, loadable from TOML
//! - **Resolver** — side-effect free id → tag lookup
//! - **Suggestions** — capped autocomplete over a fuzzy matcher
//! - **Composer** — immediate reply, or deferred reply with link previews
//! - **Command** — access check → resolve → compose, plus autocomplete

pub mod command;
pub mod composer;
pub mod resolver;
pub mod store;
pub mod suggest;

pub use command::{CommandDefinition, CommandOutcome, TagCommand};
pub use composer::{
    ComposerSettings, Composition, Delivery, MAX_PREVIEW_LINKS, PendingEdit, ResponseComposer,
};
pub use resolver::TagResolver;
pub use store::InMemoryTagStore;
pub use suggest::{MAX_SUGGESTIONS, PrefixDistanceMatcher, SuggestionEngine};
