//! OpenGraph / HTML metadata scraping.
//!
//! Looks only at `<meta>` tags and `<title>`, which is all a preview card
//! needs. Attribute values and text come back entity-decoded from `scraper`.

use scraper::{Html, Selector};

/// Preview-relevant metadata of an HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image.is_none()
    }
}

/// Reads [`PageMetadata`] out of an HTML document.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataParser;

impl MetadataParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract metadata, preferring OpenGraph over plain HTML tags.
    ///
    /// The first non-empty value of each key wins.
    pub fn parse(&self, html: &str) -> PageMetadata {
        let document = Html::parse_document(html);
        let mut og = PageMetadata::default();
        let mut plain_description = None;

        if let Ok(meta) = Selector::parse("meta") {
            for element in document.select(&meta) {
                let element = element.value();
                let Some(key) = element.attr("property").or_else(|| element.attr("name")) else {
                    continue;
                };
                let Some(content) = element
                    .attr("content")
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                else {
                    continue;
                };

                let content = content.to_string();
                match key.trim().to_ascii_lowercase().as_str() {
                    "og:title" => og.title.get_or_insert(content),
                    "og:description" => og.description.get_or_insert(content),
                    "og:image" | "og:image:url" => og.image.get_or_insert(content),
                    "description" => plain_description.get_or_insert(content),
                    _ => continue,
                };
            }
        }

        if og.title.is_none() {
            og.title = Selector::parse("title")
                .ok()
                .and_then(|s| document.select(&s).next())
                .map(|title| title.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty());
        }
        if og.description.is_none() {
            og.description = plain_description;
        }
        og
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opengraph_tags_win() {
        let html = r#"
            <html><head>
              <title>Fallback title</title>
              <meta name="description" content="plain description">
              <meta property="og:title" content="Rust &amp; Cargo">
              <meta property="og:description" content='The "book"'>
              <meta property="og:image" content="https://example.com/cover.png" />
            </head></html>
        "#;
        let meta = MetadataParser::new().parse(html);
        assert_eq!(meta.title.as_deref(), Some("Rust & Cargo"));
        assert_eq!(meta.description.as_deref(), Some("The \"book\""));
        assert_eq!(meta.image.as_deref(), Some("https://example.com/cover.png"));
    }

    #[test]
    fn falls_back_to_title_and_description() {
        let html = r#"<head><TITLE> Plain page </TITLE><meta content="about it" name="Description"></head>"#;
        let meta = MetadataParser::new().parse(html);
        assert_eq!(meta.title.as_deref(), Some("Plain page"));
        assert_eq!(meta.description.as_deref(), Some("about it"));
        assert!(meta.image.is_none());
    }

    #[test]
    fn angle_bracket_inside_attribute_value() {
        let html = r#"<meta property="og:title" content="Generics: T > U"><title>Fallback</title>"#;
        assert_eq!(
            MetadataParser::new().parse(html).title.as_deref(),
            Some("Generics: T > U")
        );
    }

    #[test]
    fn numeric_and_named_entities_are_decoded() {
        let html = r#"<meta property="og:title" content="Don&#8217;t ask &hellip;"><title>A &ndash; B</title>"#;
        let meta = MetadataParser::new().parse(html);
        assert_eq!(meta.title.as_deref(), Some("Don\u{2019}t ask \u{2026}"));

        let plain = MetadataParser::new().parse("<title>A &ndash; B</title>");
        assert_eq!(plain.title.as_deref(), Some("A \u{2013} B"));
    }

    #[test]
    fn first_value_is_kept() {
        let html = r#"<meta property="og:title" content="one"><meta property="og:title" content="two">"#;
        assert_eq!(MetadataParser::new().parse(html).title.as_deref(), Some("one"));
    }

    #[test]
    fn page_without_metadata_is_empty() {
        let meta = MetadataParser::new().parse("<html><body>hi</body></html>");
        assert!(meta.is_empty());
    }

    #[test]
    fn empty_content_is_ignored() {
        let html = r#"<meta property="og:title" content=""><title>Real</title>"#;
        assert_eq!(MetadataParser::new().parse(html).title.as_deref(), Some("Real"));
    }
}
