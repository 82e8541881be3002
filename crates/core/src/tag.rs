//! Tag domain types and the tag store trait.
//!
//! Tags are owned and mutated exclusively by an external store; from the
//! command's point of view they are read-only values.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// A named, reusable block of text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique, human-meaningful key
    pub id: String,

    /// The text rendered back into the conversation
    pub content: String,
}

impl Tag {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Result of looking up a tag by id.
///
/// A lookup never has side effects; producing a user-visible notice for an
/// unknown id is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagLookup {
    Found(Tag),
    NotFound { id: String },
}

impl TagLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, TagLookup::Found(_))
    }
}

/// Read access to the external tag store.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Content of the tag with the given id, or `None` if unknown.
    async fn content(&self, id: &str) -> Result<Option<String>, TagError>;

    /// Every known tag id.
    async fn list_ids(&self) -> Result<BTreeSet<String>, TagError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_found_flag() {
        assert!(TagLookup::Found(Tag::new("ask", "Just ask!")).is_found());
        assert!(!TagLookup::NotFound { id: "nope".into() }.is_found());
    }

    #[test]
    fn tag_serialization() {
        let tag = Tag::new("xy", "Describe the actual problem.");
        let json = serde_json::to_string(&tag).unwrap();
        assert!(json.contains("\"id\":\"xy\""));
    }
}
