//! `tagbot init` — First-time setup.

use tagbot_config::{AppConfig, TextChannelConfig};

const SAMPLE_TAGS: &str = concat!(
    "[tags]\n",
    "ask = \"Don't ask to ask, just ask your question.\"\n",
    "code = \"Please share your code as text, not as a screenshot.\"\n",
    "docs = \"The official docs live at https://doc.rust-lang.org/book/\"\n",
);

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🏷️  Tagbot — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
    } else {
        std::fs::write(&config_path, sample_config()?)?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let tags_path = AppConfig::load_from(&config_path)?.tags.resolved_path();
    if tags_path.exists() {
        println!("  Tags file exists: {}", tags_path.display());
    } else {
        std::fs::write(&tags_path, SAMPLE_TAGS)?;
        println!("✅ Created sample tags at: {}", tags_path.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. List your guild's text channels under [discord] in {}", config_path.display());
    println!("   2. Run: tagbot doctor");
    println!("   3. Run: tagbot tag ask\n");

    Ok(())
}

/// Default configuration with a placeholder bots channel.
fn sample_config() -> Result<String, toml::ser::Error> {
    let mut config = AppConfig::default();
    config.discord.text_channels.push(TextChannelConfig {
        id: "0".into(),
        name: config.bots_channel_pattern.clone(),
    });
    toml::to_string_pretty(&config)
}
