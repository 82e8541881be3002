//! `tagbot serve` — Answer Discord interactions through the stub gateway.
//!
//! Interactions are read as JSON lines from stdin and injected into the
//! gateway; every outbound action is written to stdout as a JSON line.

use std::sync::Arc;

use tagbot_channels::{
    DiscordGateway, DiscordInteraction, InboundInteraction, OutboundAction, StaticGuild,
};
use tagbot_config::AppConfig;
use tagbot_core::error::Error;
use tagbot_tags::{CommandOutcome, TagCommand};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let command = Arc::new(super::build_tag_command(&config)?);
    let guild = Arc::new(StaticGuild::from_config(&config.discord));
    let gateway = Arc::new(DiscordGateway::new(config.discord.clone()));

    if !gateway.health_check() {
        warn!("No Discord token configured, serving stdin only");
    }

    let mut inbound = gateway.start().await?;
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<OutboundAction>(64);

    let writer = tokio::spawn(async move {
        while let Some(action) = outbound_rx.recv().await {
            match serde_json::to_string(&action) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "Failed to encode outbound action"),
            }
        }
    });

    let feeder_gateway = Arc::clone(&gateway);
    let feeder = tokio::spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(interaction) = parse_interaction(&line) else {
                        continue;
                    };
                    if let Err(e) = feeder_gateway.inject(interaction).await {
                        warn!(error = %e, "Gateway refused interaction");
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
        feeder_gateway.stop().await;
    });

    info!("Serving /tag interactions");
    let mut handlers = JoinSet::new();
    while let Some(interaction) = inbound.recv().await {
        let command = Arc::clone(&command);
        let guild = Arc::clone(&guild);
        let outbound = outbound_tx.clone();
        handlers.spawn(async move { dispatch(&command, guild.as_ref(), interaction, outbound).await });
    }

    while handlers.join_next().await.is_some() {}
    drop(outbound_tx);
    writer.await?;
    feeder.await?;
    info!("Gateway closed");

    Ok(())
}

/// One interaction per non-blank line; malformed lines are logged and skipped.
fn parse_interaction(line: &str) -> Option<InboundInteraction> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line)
        .inspect_err(|e| warn!(error = %e, "Ignoring malformed interaction"))
        .ok()
}

/// Answer a single interaction, waiting out any deferred edit.
async fn dispatch(
    command: &TagCommand,
    guild: &StaticGuild,
    interaction: InboundInteraction,
    outbound: mpsc::Sender<OutboundAction>,
) {
    let interaction_id = interaction.interaction_id().to_string();
    let responder = Arc::new(DiscordInteraction::new(interaction_id.clone(), outbound));

    let result: Result<(), Error> = match interaction {
        InboundInteraction::SlashCommand { context, .. } => {
            match command.on_slash_command(&context, guild, responder).await {
                Ok(CommandOutcome::Deferred(pending)) => pending.wait().await.map(|_| ()),
                Ok(_) => Ok(()),
                Err(e) => Err(e),
            }
        }
        InboundInteraction::Autocomplete { query, .. } => {
            command.on_autocomplete(&query, responder.as_ref()).await
        }
    };

    if let Err(e) = result {
        error!(interaction = %interaction_id, error = %e, "Interaction failed");
    }
}
