//! Configuration loading, validation, and management for Tagbot.
//!
//! Loads configuration from `~/.tagbot/config.toml` with environment
//! variable overrides. Validates all settings at startup; a broken pattern
//! or missing channel is a startup concern, never a per-request one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.tagbot/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pattern matching the designated bots-only channel name
    #[serde(default = "default_bots_channel_pattern")]
    pub bots_channel_pattern: String,

    /// Pattern matching role names allowed to use `/tag` anywhere
    #[serde(default = "default_tag_manage_role_pattern")]
    pub tag_manage_role_pattern: String,

    /// Help system settings
    #[serde(default)]
    pub help_system: HelpSystemConfig,

    /// Tag storage and rendering
    #[serde(default)]
    pub tags: TagsConfig,

    /// Link preview enrichment
    #[serde(default)]
    pub previews: PreviewConfig,

    /// Discord transport
    #[serde(default)]
    pub discord: DiscordConfig,
}

fn default_bots_channel_pattern() -> String {
    "bot-commands".into()
}
fn default_tag_manage_role_pattern() -> String {
    "Moderator|Staff".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpSystemConfig {
    /// Pattern matching the help forum's root channel name
    #[serde(default = "default_help_forum_pattern")]
    pub help_forum_pattern: String,
}

fn default_help_forum_pattern() -> String {
    "questions".into()
}

impl Default for HelpSystemConfig {
    fn default() -> Self {
        Self {
            help_forum_pattern: default_help_forum_pattern(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    /// TOML file holding a `[tags]` table. Defaults to `~/.tagbot/tags.toml`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Footer hint shown under every tag
    #[serde(default = "default_footer")]
    pub footer: String,

    /// Side bar color of the tag embed
    #[serde(default = "default_ambient_color")]
    pub ambient_color: u32,
}

fn default_footer() -> String {
    "You can use /tags in any channel now".into()
}
fn default_ambient_color() -> u32 {
    0xFA8072
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            path: None,
            footer: default_footer(),
            ambient_color: default_ambient_color(),
        }
    }
}

impl TagsConfig {
    /// The tags file to load, falling back to the config directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("tags.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Whether links in tag content are previewed at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Per-request HTTP timeout of the previewer
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Give up waiting for previews after this long and finalize with the
    /// tag content only. Unset = wait for the fetch to finish.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Largest image downloaded as an attachment
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_true() -> bool {
    true
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_max_attachment_bytes() -> usize {
    8 * 1024 * 1024
}
fn default_user_agent() -> String {
    concat!("tagbot/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            request_timeout_secs: default_request_timeout_secs(),
            timeout_secs: None,
            max_attachment_bytes: default_max_attachment_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token from the Discord Developer Portal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Known guild text channels, in guild order
    #[serde(default)]
    pub text_channels: Vec<TextChannelConfig>,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &redact(&self.bot_token))
            .field("text_channels", &self.text_channels)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChannelConfig {
    pub id: String,
    pub name: String,
}

impl AppConfig {
    /// Load configuration from the default path (~/.tagbot/config.toml).
    ///
    /// Environment overrides:
    /// - `TAGBOT_DISCORD_TOKEN` — bot token
    /// - `TAGBOT_TAGS_FILE` — tags file path
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(token) = std::env::var("TAGBOT_DISCORD_TOKEN") {
            config.discord.bot_token = Some(token);
        }

        if let Ok(path) = std::env::var("TAGBOT_TAGS_FILE") {
            config.tags.path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".tagbot")
    }

    /// Validate the configuration.
    ///
    /// Only checks shape; pattern syntax is checked when the access policy
    /// compiles them.
    fn validate(&self) -> Result<(), ConfigError> {
        let patterns = [
            ("bots_channel_pattern", &self.bots_channel_pattern),
            ("tag_manage_role_pattern", &self.tag_manage_role_pattern),
            ("help_system.help_forum_pattern", &self.help_system.help_forum_pattern),
        ];
        for (key, pattern) in patterns {
            if pattern.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{key} must not be empty")));
            }
        }

        if self.tags.ambient_color > 0xFF_FF_FF {
            return Err(ConfigError::ValidationError(
                "tags.ambient_color must be a 24-bit RGB value".into(),
            ));
        }

        if self.previews.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "previews.timeout_secs must be > 0 when set".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bots_channel_pattern: default_bots_channel_pattern(),
            tag_manage_role_pattern: default_tag_manage_role_pattern(),
            help_system: HelpSystemConfig::default(),
            tags: TagsConfig::default(),
            previews: PreviewConfig::default(),
            discord: DiscordConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for tagbot_core::Error {
    fn from(err: ConfigError) -> Self {
        tagbot_core::Error::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.bots_channel_pattern, "bot-commands");
        assert_eq!(config.help_system.help_forum_pattern, "questions");
        assert_eq!(config.tags.ambient_color, 0xFA8072);
        assert!(config.previews.timeout_secs.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.bots_channel_pattern, config.bots_channel_pattern);
        assert_eq!(parsed.tags.footer, config.tags.footer);
    }

    #[test]
    fn empty_pattern_rejected() {
        let config = AppConfig {
            bots_channel_pattern: "  ".into(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bots_channel_pattern"));
    }

    #[test]
    fn zero_preview_timeout_rejected() {
        let mut config = AppConfig::default();
        config.previews.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().tag_manage_role_pattern, "Moderator|Staff");
    }

    #[test]
    fn full_config_parsing() {
        let toml_str = r#"
bots_channel_pattern = "bots?"
tag_manage_role_pattern = "Admin"

[help_system]
help_forum_pattern = "help-.*"

[previews]
timeout_secs = 15

[discord]
bot_token = "secret-token"
text_channels = [
    { id = "1", name = "general" },
    { id = "2", name = "bots" },
]
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.bots_channel_pattern, "bots?");
        assert_eq!(config.help_system.help_forum_pattern, "help-.*");
        assert_eq!(config.previews.timeout_secs, Some(15));
        assert!(config.previews.enabled);
        assert_eq!(config.discord.text_channels.len(), 2);
        assert_eq!(config.discord.text_channels[1].name, "bots");
    }

    #[test]
    fn debug_redacts_token() {
        let mut config = AppConfig::default();
        config.discord.bot_token = Some("super-secret".into());
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bots_channel_pattern = [").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => assert_eq!(path, file.path()),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn config_error_converts_to_core_error() {
        let err: tagbot_core::Error = ConfigError::ValidationError("bad".into()).into();
        assert!(err.is_config_fault());
    }
}
