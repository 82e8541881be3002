//! Tag resolution over an external store.

use std::sync::Arc;

use tagbot_core::error::TagError;
use tagbot_core::tag::{Tag, TagLookup, TagStore};

/// Looks tags up by id. Pure: no notices, no side effects.
#[derive(Clone)]
pub struct TagResolver {
    store: Arc<dyn TagStore>,
}

impl TagResolver {
    pub fn new(store: Arc<dyn TagStore>) -> Self {
        Self { store }
    }

    /// Resolve `id` to its tag, or report that it is unknown.
    pub async fn resolve(&self, id: &str) -> Result<TagLookup, TagError> {
        Ok(match self.store.content(id).await? {
            Some(content) => TagLookup::Found(Tag::new(id, content)),
            None => TagLookup::NotFound { id: id.to_string() },
        })
    }

    /// All ids the store knows, sorted.
    pub async fn known_ids(&self) -> Result<Vec<String>, TagError> {
        Ok(self.store.list_ids().await?.into_iter().collect())
    }
}
