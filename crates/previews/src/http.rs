//! HTTP link previewer.
//!
//! Fetches every link concurrently. Image responses become an attachment plus
//! an embed showing it; HTML responses become an embed built from the page's
//! OpenGraph metadata. A link that fails for any reason is skipped and the
//! remaining previews keep link order.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tagbot_config::PreviewConfig;
use tagbot_core::embed::{Attachment, Embed};
use tagbot_core::error::{Error, PreviewError};
use tagbot_core::preview::{LinkPreview, LinkPreviewer};
use tracing::{debug, warn};

use crate::metadata::{MetadataParser, PageMetadata};

/// Embed field limits of the chat platform.
const MAX_TITLE_LEN: usize = 256;
const MAX_DESCRIPTION_LEN: usize = 4096;

/// Only the head of a page is needed; anything past this is not read.
const MAX_PAGE_BYTES: usize = 512 * 1024;

/// Link previewer backed by `reqwest`.
pub struct HttpLinkPreviewer {
    client: reqwest::Client,
    parser: MetadataParser,
    max_attachment_bytes: usize,
}

impl HttpLinkPreviewer {
    /// Create a previewer from configuration.
    pub fn new(config: &PreviewConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            parser: MetadataParser::new(),
            max_attachment_bytes: config.max_attachment_bytes,
        })
    }

    /// Preview a single link. `index` keeps attachment names unique.
    async fn preview(&self, index: usize, url: &str) -> Result<LinkPreview, PreviewError> {
        let fetch_error = |reason: String| PreviewError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("status {status}")));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if let Some(subtype) = content_type.strip_prefix("image/") {
            if response
                .content_length()
                .is_some_and(|len| len as usize > self.max_attachment_bytes)
            {
                return Err(fetch_error("image too large".into()));
            }
            let (data, truncated) = read_capped(response, self.max_attachment_bytes)
                .await
                .map_err(|e| fetch_error(e.to_string()))?;
            if truncated {
                return Err(fetch_error("image too large".into()));
            }

            let attachment = Attachment::new(image_filename(index, subtype), data);
            let embed = Embed::default().url(url).image_url(attachment.reference());
            return Ok(LinkPreview {
                embed,
                attachment: Some(attachment),
            });
        }

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(fetch_error(format!("unsupported content type '{content_type}'")));
        }

        let (body, truncated) = read_capped(response, MAX_PAGE_BYTES)
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        if truncated {
            debug!(url, limit = MAX_PAGE_BYTES, "Page cut short for metadata parsing");
        }
        let metadata = self.parser.parse(&String::from_utf8_lossy(&body));
        if metadata.is_empty() {
            return Err(fetch_error("page has no preview metadata".into()));
        }

        Ok(LinkPreview::embed_only(metadata_embed(
            url,
            metadata,
            &final_url,
        )))
    }
}

#[async_trait]
impl LinkPreviewer for HttpLinkPreviewer {
    async fn create_previews(&self, urls: &[String]) -> Result<Vec<LinkPreview>, PreviewError> {
        let results = join_all(
            urls.iter()
                .enumerate()
                .map(|(index, url)| self.preview(index, url)),
        )
        .await;

        let previews: Vec<LinkPreview> = results
            .into_iter()
            .filter_map(|result| match result {
                Ok(preview) => Some(preview),
                Err(e) => {
                    warn!(error = %e, "Link preview skipped");
                    None
                }
            })
            .collect();

        debug!(
            requested = urls.len(),
            produced = previews.len(),
            "Link previews fetched"
        );
        Ok(previews)
    }
}

/// Read at most `limit` bytes of the body, chunk by chunk.
///
/// The flag is set when the body had more to give.
async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<(Vec<u8>, bool), reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }
    Ok((body, false))
}

fn metadata_embed(url: &str, metadata: PageMetadata, base: &reqwest::Url) -> Embed {
    let mut embed = Embed::default().url(url);
    if let Some(title) = metadata.title {
        embed = embed.title(truncate(&title, MAX_TITLE_LEN));
    }
    if let Some(description) = metadata.description {
        embed.description = Some(truncate(&description, MAX_DESCRIPTION_LEN));
    }
    if let Some(image) = metadata.image.and_then(|i| base.join(&i).ok()) {
        embed = embed.image_url(image.to_string());
    }
    embed
}

fn image_filename(index: usize, subtype: &str) -> String {
    let subtype = subtype.split(';').next().unwrap_or("").trim();
    let extension = match subtype {
        "jpeg" | "pjpeg" => "jpg",
        "svg+xml" => "svg",
        "" => "img",
        other => other,
    };
    format!("preview-{index}.{extension}")
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn image_filenames_follow_mime_subtype() {
        assert_eq!(image_filename(0, "png"), "preview-0.png");
        assert_eq!(image_filename(2, "jpeg"), "preview-2.jpg");
        assert_eq!(image_filename(1, "svg+xml; charset=utf-8"), "preview-1.svg");
        assert_eq!(image_filename(3, ""), "preview-3.img");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        let cut = truncate("abcdefghij", 5);
        assert_eq!(cut.chars().count(), 5);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn relative_og_image_is_resolved() {
        let base = reqwest::Url::parse("https://example.com/docs/page").unwrap();
        let metadata = PageMetadata {
            title: Some("Docs".into()),
            description: None,
            image: Some("/static/cover.png".into()),
        };
        let embed = metadata_embed("https://example.com/docs/page", metadata, &base);
        assert_eq!(embed.title.as_deref(), Some("Docs"));
        assert_eq!(
            embed.image_url.as_deref(),
            Some("https://example.com/static/cover.png")
        );
        assert_eq!(embed.url.as_deref(), Some("https://example.com/docs/page"));
    }

    #[tokio::test]
    async fn unreachable_links_are_skipped() {
        let config = PreviewConfig {
            request_timeout_secs: 1,
            ..PreviewConfig::default()
        };
        let previewer = HttpLinkPreviewer::new(&config).unwrap();
        let previews = previewer
            .create_previews(&["http://127.0.0.1:9/nothing-here".to_string()])
            .await
            .unwrap();
        assert!(previews.is_empty());
    }

    #[tokio::test]
    async fn empty_batch_yields_no_previews() {
        let previewer = HttpLinkPreviewer::new(&PreviewConfig::default()).unwrap();
        assert!(previewer.create_previews(&[]).await.unwrap().is_empty());
    }

    fn previewer_with(max_attachment_bytes: usize) -> HttpLinkPreviewer {
        HttpLinkPreviewer::new(&PreviewConfig {
            request_timeout_secs: 5,
            max_attachment_bytes,
            ..PreviewConfig::default()
        })
        .unwrap()
    }

    async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    const DOCS_PAGE: &str = r#"<html><head>
        <title>Fallback</title>
        <meta property="og:title" content="The Book &ndash; Generics">
        <meta property="og:description" content="Generic types, traits and lifetimes">
        <meta property="og:image" content="/img/cover.png">
        </head><body>...</body></html>"#;

    #[tokio::test]
    async fn image_becomes_attachment() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/logo.png",
            ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
        )
        .await;
        let link = format!("{}/logo.png", server.uri());

        let previews = previewer_with(1024).create_previews(&[link.clone()]).await.unwrap();

        assert_eq!(previews.len(), 1);
        let attachment = previews[0].attachment.as_ref().unwrap();
        assert_eq!(attachment.filename, "preview-0.png");
        assert_eq!(attachment.data, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(
            previews[0].embed.image_url.as_deref(),
            Some("attachment://preview-0.png")
        );
        assert_eq!(previews[0].embed.url.as_deref(), Some(link.as_str()));
    }

    #[tokio::test]
    async fn html_becomes_opengraph_embed() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/docs/page",
            ResponseTemplate::new(200).set_body_raw(DOCS_PAGE, "text/html; charset=utf-8"),
        )
        .await;
        let link = format!("{}/docs/page", server.uri());

        let previews = previewer_with(1024).create_previews(&[link]).await.unwrap();

        assert_eq!(previews.len(), 1);
        let embed = &previews[0].embed;
        assert!(previews[0].attachment.is_none());
        assert_eq!(embed.title.as_deref(), Some("The Book \u{2013} Generics"));
        assert_eq!(
            embed.description.as_deref(),
            Some("Generic types, traits and lifetimes")
        );
        assert_eq!(
            embed.image_url.as_deref(),
            Some(format!("{}/img/cover.png", server.uri()).as_str())
        );
    }

    #[tokio::test]
    async fn error_status_is_skipped() {
        let server = MockServer::start().await;
        serve(&server, "/gone", ResponseTemplate::new(404)).await;

        let previews = previewer_with(1024)
            .create_previews(&[format!("{}/gone", server.uri())])
            .await
            .unwrap();
        assert!(previews.is_empty());
    }

    #[tokio::test]
    async fn oversized_image_is_rejected() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/huge.jpg",
            ResponseTemplate::new(200).set_body_raw(vec![0u8; 64], "image/jpeg"),
        )
        .await;

        let previews = previewer_with(16)
            .create_previews(&[format!("{}/huge.jpg", server.uri())])
            .await
            .unwrap();
        assert!(previews.is_empty());
    }

    #[tokio::test]
    async fn mixed_results_keep_link_order() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/docs/page",
            ResponseTemplate::new(200).set_body_raw(DOCS_PAGE, "text/html"),
        )
        .await;
        serve(&server, "/broken", ResponseTemplate::new(500)).await;
        serve(
            &server,
            "/logo.gif",
            ResponseTemplate::new(200).set_body_raw(vec![b'G', b'I', b'F'], "image/gif"),
        )
        .await;
        let links = vec![
            format!("{}/docs/page", server.uri()),
            format!("{}/broken", server.uri()),
            format!("{}/logo.gif", server.uri()),
        ];

        let previews = previewer_with(1024).create_previews(&links).await.unwrap();

        assert_eq!(previews.len(), 2);
        assert!(previews[0].attachment.is_none());
        assert_eq!(
            previews[1].attachment.as_ref().map(|a| a.filename.as_str()),
            Some("preview-2.gif")
        );
    }

    #[tokio::test]
    async fn page_is_read_up_to_cap() {
        let padding = "x".repeat(MAX_PAGE_BYTES);
        let early = format!(
            r#"<html><head><meta property="og:title" content="Early"></head><body>{padding}</body></html>"#
        );
        let late = format!(
            r#"<html><head><!-- {padding} --><meta property="og:title" content="Late"></head></html>"#
        );
        let server = MockServer::start().await;
        serve(&server, "/early", ResponseTemplate::new(200).set_body_raw(early, "text/html")).await;
        serve(&server, "/late", ResponseTemplate::new(200).set_body_raw(late, "text/html")).await;

        let previews = previewer_with(1024)
            .create_previews(&[
                format!("{}/early", server.uri()),
                format!("{}/late", server.uri()),
            ])
            .await
            .unwrap();

        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].embed.title.as_deref(), Some("Early"));
    }
}
