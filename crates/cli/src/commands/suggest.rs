//! `tagbot suggest` — Show autocomplete choices.

use tagbot_channels::ConsoleResponder;
use tagbot_config::AppConfig;
use tagbot_core::interaction::AutocompleteQuery;
use tagbot_tags::command::ID_OPTION;

pub async fn run(fragment: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let command = super::build_tag_command(&config)?;

    let query = AutocompleteQuery {
        option: ID_OPTION.into(),
        value: fragment.to_string(),
    };
    command
        .on_autocomplete(&query, &ConsoleResponder::new())
        .await?;

    Ok(())
}
