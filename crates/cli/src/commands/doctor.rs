//! `tagbot doctor` — Diagnose configuration.

use tagbot_channels::StaticGuild;
use tagbot_config::AppConfig;
use tagbot_security::AccessPolicy;
use tagbot_tags::InMemoryTagStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Tagbot Doctor — Configuration Diagnostics");
    println!("============================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — run `tagbot init` (using defaults)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    match AccessPolicy::from_config(&config) {
        Ok(policy) => {
            println!("  ✅ Access patterns compile");

            let guild = StaticGuild::from_config(&config.discord);
            match policy.bots_channel(&guild) {
                Ok(channel) => println!("  ✅ Bots channel resolves to {} ({channel})", channel.name),
                Err(e) => {
                    println!("  ❌ {e} — add it to [discord] text_channels");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    let tags_path = config.tags.resolved_path();
    match InMemoryTagStore::from_file(&tags_path) {
        Ok(store) if store.is_empty().await => {
            println!("  ⚠️  No tags found at {}", tags_path.display());
            issues += 1;
        }
        Ok(store) => println!("  ✅ {} tag(s) loaded from {}", store.len().await, tags_path.display()),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    if config.previews.enabled {
        match config.previews.timeout_secs {
            Some(secs) => println!("  ✅ Link previews enabled (finalize after {secs}s)"),
            None => println!("  ✅ Link previews enabled"),
        }
    } else {
        println!("  ℹ️  Link previews disabled");
    }

    if config.discord.bot_token.is_some() {
        println!("  ✅ Discord token configured");
    } else {
        println!("  ⚠️  No Discord token — set TAGBOT_DISCORD_TOKEN or [discord] bot_token");
        issues += 1;
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
