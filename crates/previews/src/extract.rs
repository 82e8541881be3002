//! URL extraction from free text.

use regex_lite::Regex;
use tagbot_core::error::PreviewError;
use tagbot_core::preview::LinkExtractor;

const URL_PATTERN: &str = r#"https?://[^\s<>"`|]+"#;

/// Punctuation that ends a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '*', '_', '~', '\''];

/// Finds `http://` and `https://` links, in order of first appearance.
///
/// Trailing punctuation is trimmed, as is a closing bracket without a
/// matching opener inside the URL (markdown `[text](url)`). Duplicates are
/// dropped.
#[derive(Debug, Clone)]
pub struct UrlExtractor {
    pattern: Regex,
}

impl UrlExtractor {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"),
        }
    }

    /// All links in `text`, deduplicated, in order.
    pub fn links(&self, text: &str) -> Vec<String> {
        let mut links: Vec<String> = Vec::new();
        for found in self.pattern.find_iter(text) {
            let link = trim_link(found.as_str());
            if is_plausible(link) && !links.iter().any(|l| l == link) {
                links.push(link.to_string());
            }
        }
        links
    }
}

impl Default for UrlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor for UrlExtractor {
    fn extract_links(&self, text: &str) -> Result<Vec<String>, PreviewError> {
        Ok(self.links(text))
    }
}

fn trim_link(mut link: &str) -> &str {
    loop {
        let before = link.len();
        link = link.trim_end_matches(TRAILING_PUNCTUATION);
        for (open, close) in [('(', ')'), ('[', ']'), ('{', '}')] {
            if link.ends_with(close) && link.matches(close).count() > link.matches(open).count() {
                link = &link[..link.len() - 1];
            }
        }
        if link.len() == before {
            return link;
        }
    }
}

/// A scheme followed by at least a host.
fn is_plausible(link: &str) -> bool {
    link.split_once("://")
        .is_some_and(|(_, rest)| rest.chars().next().is_some_and(char::is_alphanumeric))
}
