//! Link previews for Tagbot.
//!
//! - **Extraction** — find `http(s)` links in tag content
//! - **HTTP previewer** — fetch each link concurrently and turn it into an
//!   embed (OpenGraph metadata) or an image attachment

pub mod extract;
pub mod http;
pub mod metadata;

pub use extract::UrlExtractor;
pub use http::HttpLinkPreviewer;
pub use metadata::PageMetadata;
