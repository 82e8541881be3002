//! Response composer — turns a resolved tag into the outbound rendering.
//!
//! Two delivery paths:
//! - **Immediate**: no links in the tag → one `reply` with the tag embed.
//! - **Deferred**: links present → `defer` right away, fetch previews in a
//!   spawned task, then exactly one `edit_original` with the tag embed
//!   followed by the previews.
//!
//! The reply-to mention rides on the single reply or on the final edit,
//! never on the placeholder.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tagbot_config::AppConfig;
use tagbot_core::embed::{Embed, MAX_EMBED_COUNT, RenderedResponse};
use tagbot_core::error::{Error, PreviewError};
use tagbot_core::event::{DomainEvent, EventBus};
use tagbot_core::interaction::{InteractionResponder, UserRef};
use tagbot_core::preview::{LinkExtractor, LinkPreview, LinkPreviewer};
use tagbot_core::tag::Tag;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Links that fit next to the tag embed in a single message.
pub const MAX_PREVIEW_LINKS: usize = MAX_EMBED_COUNT - 1;

/// Rendering knobs, usually taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub footer: String,
    pub ambient_color: u32,
    pub previews_enabled: bool,
    /// Finalize without previews if fetching takes longer than this
    pub preview_timeout: Option<Duration>,
}

impl ComposerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            footer: config.tags.footer.clone(),
            ambient_color: config.tags.ambient_color,
            previews_enabled: config.previews.enabled,
            preview_timeout: config.previews.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Everything decided before anything is sent.
#[derive(Debug, Clone)]
pub struct Composition {
    pub tag_id: String,
    pub primary: Embed,
    pub mention: Option<String>,
    /// Links to preview, already capped at [`MAX_PREVIEW_LINKS`]
    pub links: Vec<String>,
}

/// How the response went out.
#[derive(Debug)]
pub enum Delivery {
    /// Sent as a single reply
    Immediate(RenderedResponse),
    /// Acknowledged; the final edit follows
    Deferred(PendingEdit),
}

/// Handle on the in-flight edit of a deferred response.
#[derive(Debug)]
pub struct PendingEdit {
    link_count: usize,
    completion: oneshot::Receiver<Result<RenderedResponse, Error>>,
}

impl PendingEdit {
    /// Number of links being previewed.
    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// Wait until the final edit has been attempted.
    ///
    /// Yields what was sent, or the transport error of the edit.
    pub async fn wait(self) -> Result<RenderedResponse, Error> {
        self.completion
            .await
            .map_err(|_| Error::Internal("Preview task ended without finalizing".into()))?
    }
}

/// Builds and delivers tag responses.
pub struct ResponseComposer {
    extractor: Arc<dyn LinkExtractor>,
    previewer: Arc<dyn LinkPreviewer>,
    settings: ComposerSettings,
    events: Option<Arc<EventBus>>,
}

impl ResponseComposer {
    pub fn new(
        extractor: Arc<dyn LinkExtractor>,
        previewer: Arc<dyn LinkPreviewer>,
        settings: ComposerSettings,
    ) -> Self {
        Self {
            extractor,
            previewer,
            settings,
            events: None,
        }
    }

    /// Publish [`DomainEvent::PreviewsAttached`] on `bus` after each edit.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// The tag content card.
    pub fn primary_embed(&self, content: &str, requested_at: DateTime<Utc>) -> Embed {
        Embed::with_description(content)
            .footer(self.settings.footer.clone())
            .timestamp(requested_at)
            .color(self.settings.ambient_color)
    }

    /// Links worth previewing, capped so the tag embed keeps its slot.
    ///
    /// Extraction failures degrade to no links.
    pub fn links_for(&self, content: &str) -> Vec<String> {
        if !self.settings.previews_enabled {
            return Vec::new();
        }
        match self.extractor.extract_links(content) {
            Ok(mut links) => {
                links.truncate(MAX_PREVIEW_LINKS);
                links
            }
            Err(e) => {
                warn!(error = %e, "Link extraction failed, responding without previews");
                Vec::new()
            }
        }
    }

    /// Decide what to send for `tag`.
    pub fn compose(
        &self,
        tag: &Tag,
        reply_to: Option<&UserRef>,
        requested_at: DateTime<Utc>,
    ) -> Composition {
        Composition {
            tag_id: tag.id.clone(),
            primary: self.primary_embed(&tag.content, requested_at),
            mention: reply_to.map(UserRef::mention),
            links: self.links_for(&tag.content),
        }
    }

    /// Send `composition` through `responder`.
    ///
    /// Produces exactly one terminal response: a single `reply`, or a
    /// `defer` followed by one `edit_original` from a spawned task.
    pub async fn deliver(
        &self,
        composition: Composition,
        responder: Arc<dyn InteractionResponder>,
    ) -> Result<Delivery, Error> {
        let Composition {
            tag_id,
            primary,
            mention,
            links,
        } = composition;

        if links.is_empty() {
            let response = RenderedResponse::primary_only(primary, mention);
            responder.reply(response.clone()).await?;
            debug!(tag = %tag_id, "Tag sent without previews");
            return Ok(Delivery::Immediate(response));
        }

        responder.defer().await?;

        let (tx, rx) = oneshot::channel();
        let link_count = links.len();
        let previewer = Arc::clone(&self.previewer);
        let timeout = self.settings.preview_timeout;
        let events = self.events.clone();

        tokio::spawn(async move {
            let previews = match fetch_previews(previewer, links, timeout).await {
                Ok(previews) => previews,
                Err(e) => {
                    warn!(tag = %tag_id, error = %e, "Link previews unavailable");
                    Vec::new()
                }
            };

            let response = finalize(primary, mention, previews);
            let result = responder
                .edit_original(response.clone())
                .await
                .map(|()| response)
                .map_err(Error::from);

            match &result {
                Ok(sent) => {
                    info!(
                        tag = %tag_id,
                        previews = sent.supplementary.len(),
                        attachments = sent.attachments.len(),
                        "Deferred tag response finalized"
                    );
                    if let Some(bus) = events {
                        bus.publish(DomainEvent::PreviewsAttached {
                            tag_id: tag_id.clone(),
                            preview_count: sent.supplementary.len(),
                            attachment_count: sent.attachments.len(),
                            timestamp: Utc::now(),
                        });
                    }
                }
                Err(e) => warn!(tag = %tag_id, error = %e, "Failed to finalize deferred tag response"),
            }

            // Nobody waiting is fine
            let _ = tx.send(result);
        });

        Ok(Delivery::Deferred(PendingEdit {
            link_count,
            completion: rx,
        }))
    }
}

/// Run the previewer in its own task so a panic there still ends in an edit.
async fn fetch_previews(
    previewer: Arc<dyn LinkPreviewer>,
    links: Vec<String>,
    timeout: Option<Duration>,
) -> Result<Vec<LinkPreview>, PreviewError> {
    let task = tokio::spawn(async move { previewer.create_previews(&links).await });
    let abort = task.abort_handle();

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                abort.abort();
                return Err(PreviewError::Timeout {
                    timeout_secs: limit.as_secs(),
                });
            }
        },
        None => task.await,
    };

    joined.map_err(|e| PreviewError::Aborted(e.to_string()))?
}

/// Tag embed first, then one embed per preview; absent attachments dropped.
fn finalize(primary: Embed, mention: Option<String>, previews: Vec<LinkPreview>) -> RenderedResponse {
    let mut response = RenderedResponse::primary_only(primary, mention);
    let (embeds, attachments): (Vec<_>, Vec<_>) = previews
        .into_iter()
        .take(MAX_PREVIEW_LINKS)
        .map(|preview| (preview.embed, preview.attachment))
        .unzip();

    for embed in embeds {
        response.push_embed(embed);
    }
    response.extend_attachments(attachments);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tagbot_core::embed::Attachment;

    struct FailingExtractor;

    impl LinkExtractor for FailingExtractor {
        fn extract_links(&self, _text: &str) -> Result<Vec<String>, PreviewError> {
            Err(PreviewError::Extraction("boom".into()))
        }
    }

    /// Splits on whitespace and keeps anything starting with `http`.
    struct WordExtractor;

    impl LinkExtractor for WordExtractor {
        fn extract_links(&self, text: &str) -> Result<Vec<String>, PreviewError> {
            Ok(text
                .split_whitespace()
                .filter(|w| w.starts_with("http"))
                .map(String::from)
                .collect())
        }
    }

    struct NoPreviews;

    #[async_trait]
    impl LinkPreviewer for NoPreviews {
        async fn create_previews(&self, _urls: &[String]) -> Result<Vec<LinkPreview>, PreviewError> {
            Ok(Vec::new())
        }
    }

    fn composer(extractor: Arc<dyn LinkExtractor>) -> ResponseComposer {
        ResponseComposer::new(extractor, Arc::new(NoPreviews), ComposerSettings::default())
    }

    #[test]
    fn primary_embed_carries_content_footer_and_color() {
        let now = Utc::now();
        let embed = composer(Arc::new(WordExtractor)).primary_embed("Just ask.", now);
        assert_eq!(embed.description.as_deref(), Some("Just ask."));
        assert_eq!(embed.footer.as_deref(), Some("You can use /tags in any channel now"));
        assert_eq!(embed.timestamp, Some(now));
        assert_eq!(embed.color, Some(0xFA8072));
    }

    #[test]
    fn links_are_capped_below_embed_limit() {
        let content: Vec<String> = (0..15).map(|i| format!("https://e{i}.dev")).collect();
        let links = composer(Arc::new(WordExtractor)).links_for(&content.join(" "));
        assert_eq!(links.len(), MAX_PREVIEW_LINKS);
        assert_eq!(links[0], "https://e0.dev");
        assert_eq!(links[8], "https://e8.dev");
    }

    #[test]
    fn extraction_failure_means_no_links() {
        assert!(composer(Arc::new(FailingExtractor)).links_for("https://a.dev").is_empty());
    }

    #[test]
    fn disabled_previews_skip_extraction() {
        let settings = ComposerSettings {
            previews_enabled: false,
            ..ComposerSettings::default()
        };
        let composer = ResponseComposer::new(Arc::new(WordExtractor), Arc::new(NoPreviews), settings);
        assert!(composer.links_for("https://a.dev").is_empty());
    }

    #[test]
    fn compose_renders_mention() {
        let tag = Tag::new("ask", "Just ask. https://dontasktoask.com");
        let user = UserRef::new("42", "alice");
        let composition = composer(Arc::new(WordExtractor)).compose(&tag, Some(&user), Utc::now());
        assert_eq!(composition.tag_id, "ask");
        assert_eq!(composition.mention.as_deref(), Some("<@42>"));
        assert_eq!(composition.links, vec!["https://dontasktoask.com"]);
    }

    #[test]
    fn finalize_orders_embeds_and_drops_absent_attachments() {
        let previews = vec![
            LinkPreview::embed_only(Embed::default().title("one")),
            LinkPreview {
                embed: Embed::default().title("two"),
                attachment: Some(Attachment::new("preview-1.png", vec![1])),
            },
        ];
        let response = finalize(Embed::with_description("tag"), Some("<@1>".into()), previews);
        let titles: Vec<_> = response.supplementary.iter().map(|e| e.title.clone()).collect();
        assert_eq!(titles, vec![Some("one".to_string()), Some("two".to_string())]);
        assert_eq!(response.primary.description.as_deref(), Some("tag"));
        assert_eq!(response.attachments.len(), 1);
        assert_eq!(response.content.as_deref(), Some("<@1>"));
    }

    #[test]
    fn settings_follow_config() {
        let mut config = AppConfig::default();
        config.tags.footer = "custom".into();
        config.previews.timeout_secs = Some(3);
        let settings = ComposerSettings::from_config(&config);
        assert_eq!(settings.footer, "custom");
        assert_eq!(settings.preview_timeout, Some(Duration::from_secs(3)));
    }
}
