//! Embed and rendered-response value objects.
//!
//! These are what flows out of the composer and into a transport:
//! tag content → primary embed → (optional link previews) → `RenderedResponse`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of embeds a single chat message may carry.
pub const MAX_EMBED_COUNT: usize = 10;

/// A rendered card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Link the title points to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Large image shown below the description. May be an
    /// `attachment://<filename>` reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// RGB color of the side bar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

impl Embed {
    /// Start an embed with just a description.
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// A file uploaded alongside a message.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Reference usable from an embed image field.
    pub fn reference(&self) -> String {
        format!("attachment://{}", self.filename)
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

/// The outbound rendering of a single `/tag` invocation.
///
/// The primary embed is held separately from the supplementary ones so it
/// can never be displaced: [`RenderedResponse::embeds`] always yields it
/// first, and enrichment can only append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedResponse {
    /// The tag content card
    pub primary: Embed,

    /// Link preview cards, in link order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supplementary: Vec<Embed>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// Leading message text (the reply-to mention)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RenderedResponse {
    /// A response carrying only the primary embed.
    pub fn primary_only(primary: Embed, content: Option<String>) -> Self {
        Self {
            primary,
            supplementary: Vec::new(),
            attachments: Vec::new(),
            content,
        }
    }

    /// Append a supplementary embed after everything already present.
    pub fn push_embed(&mut self, embed: Embed) {
        self.supplementary.push(embed);
    }

    /// Append attachments, dropping absent entries.
    pub fn extend_attachments(&mut self, attachments: impl IntoIterator<Item = Option<Attachment>>) {
        self.attachments.extend(attachments.into_iter().flatten());
    }

    /// All embeds, primary first.
    pub fn embeds(&self) -> impl Iterator<Item = &Embed> {
        std::iter::once(&self.primary).chain(self.supplementary.iter())
    }

    pub fn embed_count(&self) -> usize {
        1 + self.supplementary.len()
    }
}
