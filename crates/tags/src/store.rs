//! In-memory tag store — backs the CLI and tests.
//!
//! Can be seeded from a TOML file with a single `[tags]` table:
//!
//! ```toml
//! [tags]
//! ask = "Don't ask to ask, just ask."
//! xy = "Describe the actual problem, not your attempted solution."
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tagbot_core::error::TagError;
use tagbot_core::tag::TagStore;
use tokio::sync::RwLock;

#[derive(Deserialize)]
struct TagsFile {
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// A tag store that keeps everything in a map.
pub struct InMemoryTagStore {
    tags: Arc<RwLock<BTreeMap<String, String>>>,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self::with_tags(std::iter::empty::<(String, String)>())
    }

    /// Create a store pre-filled with `(id, content)` pairs.
    pub fn with_tags<I, K, V>(tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            tags: Arc::new(RwLock::new(
                tags.into_iter()
                    .map(|(id, content)| (id.into(), content.into()))
                    .collect(),
            )),
        }
    }

    /// Parse a `[tags]` TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, TagError> {
        let file: TagsFile = toml::from_str(content).map_err(|e| TagError::Load {
            path: "<inline>".into(),
            reason: e.to_string(),
        })?;
        Ok(Self::with_tags(file.tags))
    }

    /// Load tags from a TOML file. A missing file yields an empty store.
    pub fn from_file(path: &Path) -> Result<Self, TagError> {
        if !path.exists() {
            tracing::info!("No tags file found at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|e| TagError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            TagError::Load { reason, .. } => TagError::Load {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Add or replace a tag.
    pub async fn insert(&self, id: impl Into<String>, content: impl Into<String>) {
        self.tags.write().await.insert(id.into(), content.into());
    }

    pub async fn len(&self) -> usize {
        self.tags.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tags.read().await.is_empty()
    }
}

impl Default for InMemoryTagStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagStore for InMemoryTagStore {
    async fn content(&self, id: &str) -> Result<Option<String>, TagError> {
        Ok(self.tags.read().await.get(id).cloned())
    }

    async fn list_ids(&self) -> Result<BTreeSet<String>, TagError> {
        Ok(self.tags.read().await.keys().cloned().collect())
    }
}
