pub mod doctor;
pub mod init;
pub mod serve;
pub mod suggest;
pub mod tag;

use std::sync::Arc;

use tagbot_config::AppConfig;
use tagbot_previews::{HttpLinkPreviewer, UrlExtractor};
use tagbot_tags::{InMemoryTagStore, PrefixDistanceMatcher, TagCommand};

/// Wire `/tag` from configuration with the default collaborators.
pub fn build_tag_command(config: &AppConfig) -> Result<TagCommand, Box<dyn std::error::Error>> {
    let store = InMemoryTagStore::from_file(&config.tags.resolved_path())?;
    let previewer = HttpLinkPreviewer::new(&config.previews)?;

    Ok(TagCommand::from_config(
        config,
        Arc::new(store),
        Arc::new(PrefixDistanceMatcher),
        Arc::new(UrlExtractor::new()),
        Arc::new(previewer),
    )?)
}
