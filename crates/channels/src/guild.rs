//! Guild directory backed by a fixed channel list.

use tagbot_config::DiscordConfig;
use tagbot_core::interaction::{GuildChannel, GuildDirectory};

/// Text channels known up front, in guild order.
#[derive(Debug, Clone, Default)]
pub struct StaticGuild {
    channels: Vec<GuildChannel>,
}

impl StaticGuild {
    pub fn new(channels: Vec<GuildChannel>) -> Self {
        Self { channels }
    }

    /// The channels listed under `[discord] text_channels`.
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self::new(
            config
                .text_channels
                .iter()
                .map(|c| GuildChannel::new(&c.id, &c.name))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl GuildDirectory for StaticGuild {
    fn text_channels(&self) -> Vec<GuildChannel> {
        self.channels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbot_config::TextChannelConfig;

    #[test]
    fn keeps_config_order() {
        let config = DiscordConfig {
            bot_token: None,
            text_channels: vec![
                TextChannelConfig {
                    id: "1".into(),
                    name: "general".into(),
                },
                TextChannelConfig {
                    id: "2".into(),
                    name: "bot-commands".into(),
                },
            ],
        };

        let guild = StaticGuild::from_config(&config);
        assert_eq!(guild.len(), 2);
        let names: Vec<_> = guild.text_channels().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["general", "bot-commands"]);
    }

    #[test]
    fn empty_by_default() {
        assert!(StaticGuild::default().text_channels().is_empty());
    }
}
