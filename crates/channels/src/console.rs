//! Console transport: renders interaction responses as plain text.
//!
//! Used by `tagbot tag` and `tagbot suggest` to run the command locally.

use async_trait::async_trait;
use tagbot_core::embed::{Embed, RenderedResponse};
use tagbot_core::error::TransportError;
use tagbot_core::interaction::{Choice, InteractionResponder};
use tokio::io::{self, AsyncWriteExt};

/// Writes every response to stdout.
#[derive(Debug, Default)]
pub struct ConsoleResponder;

impl ConsoleResponder {
    pub fn new() -> Self {
        Self
    }

    async fn write(&self, text: String) -> Result<(), TransportError> {
        let mut stdout = io::stdout();
        stdout
            .write_all(text.as_bytes())
            .await
            .map_err(|e| TransportError::DeliveryFailed(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| TransportError::DeliveryFailed(e.to_string()))
    }
}

#[async_trait]
impl InteractionResponder for ConsoleResponder {
    async fn reply(&self, response: RenderedResponse) -> Result<(), TransportError> {
        self.write(render_response(&response)).await
    }

    async fn reply_ephemeral(&self, text: &str) -> Result<(), TransportError> {
        self.write(format!("(only you can see this) {text}\n")).await
    }

    async fn defer(&self) -> Result<(), TransportError> {
        self.write("Tagbot is thinking...\n".into()).await
    }

    async fn edit_original(&self, response: RenderedResponse) -> Result<(), TransportError> {
        self.write(render_response(&response)).await
    }

    async fn reply_choices(&self, choices: Vec<Choice>) -> Result<(), TransportError> {
        self.write(render_choices(&choices)).await
    }
}

/// Text rendering of a response: mention, embeds in order, attachments.
pub fn render_response(response: &RenderedResponse) -> String {
    let mut out = String::new();
    if let Some(content) = &response.content {
        out.push_str(content);
        out.push('\n');
    }
    for embed in response.embeds() {
        render_embed(embed, &mut out);
    }
    for attachment in &response.attachments {
        out.push_str(&format!(
            "[attachment {} ({} bytes)]\n",
            attachment.filename,
            attachment.data.len()
        ));
    }
    out
}

fn render_embed(embed: &Embed, out: &mut String) {
    out.push_str("┌─\n");
    if let Some(title) = &embed.title {
        out.push_str(&format!("│ {title}\n"));
    }
    if let Some(url) = &embed.url {
        out.push_str(&format!("│ <{url}>\n"));
    }
    if let Some(description) = &embed.description {
        for line in description.lines() {
            out.push_str(&format!("│ {line}\n"));
        }
    }
    if let Some(image) = &embed.image_url {
        out.push_str(&format!("│ image: {image}\n"));
    }
    if let Some(footer) = &embed.footer {
        out.push_str(&format!("│ ── {footer}\n"));
    }
    out.push_str("└─\n");
}

/// One choice per line.
pub fn render_choices(choices: &[Choice]) -> String {
    if choices.is_empty() {
        return "(no matching tags)\n".into();
    }
    choices.iter().map(|c| format!("  {}\n", c.value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbot_core::embed::Attachment;

    #[test]
    fn renders_mention_embeds_and_attachments() {
        let mut response = RenderedResponse::primary_only(
            Embed::with_description("Just ask.\nReally.").footer("footer"),
            Some("<@1>".into()),
        );
        response.push_embed(Embed::default().title("Docs").url("https://docs.rs"));
        response.extend_attachments([Some(Attachment::new("preview-0.png", vec![1, 2, 3]))]);

        let text = render_response(&response);
        assert!(text.starts_with("<@1>\n"));
        assert!(text.contains("│ Just ask.\n│ Really.\n"));
        assert!(text.contains("│ ── footer"));
        assert!(text.contains("│ Docs\n│ <https://docs.rs>"));
        assert!(text.contains("[attachment preview-0.png (3 bytes)]"));
        assert!(text.find("Just ask").unwrap() < text.find("Docs").unwrap());
    }

    #[test]
    fn renders_choices() {
        assert_eq!(
            render_choices(&[Choice::same("ask"), Choice::same("code")]),
            "  ask\n  code\n"
        );
        assert_eq!(render_choices(&[]), "(no matching tags)\n");
    }
}
