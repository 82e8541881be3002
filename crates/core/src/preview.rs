//! Link extraction and link preview traits.
//!
//! Both are external collaborators of the composer. Failures on either side
//! only ever degrade a response to "no previews".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embed::{Attachment, Embed};
use crate::error::PreviewError;

/// A rendered card for one URL, plus an optional file it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPreview {
    pub embed: Embed,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl LinkPreview {
    pub fn embed_only(embed: Embed) -> Self {
        Self {
            embed,
            attachment: None,
        }
    }
}

/// Finds candidate links in free text.
pub trait LinkExtractor: Send + Sync {
    /// Links in order of appearance.
    fn extract_links(&self, text: &str) -> Result<Vec<String>, PreviewError>;
}

/// Produces previews for a batch of links.
///
/// Implementations own parallelism. Links that fail to preview are left out;
/// the remaining previews keep the order of `urls`.
#[async_trait]
pub trait LinkPreviewer: Send + Sync {
    async fn create_previews(&self, urls: &[String]) -> Result<Vec<LinkPreview>, PreviewError>;
}
