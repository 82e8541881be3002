//! Interaction transports for Tagbot.
//!
//! A transport answers one interaction at a time through
//! [`InteractionResponder`](tagbot_core::interaction::InteractionResponder)
//! and describes the guild through
//! [`GuildDirectory`](tagbot_core::interaction::GuildDirectory).
//!
//! Available transports:
//! - **Console**: renders responses as text on stdout
//! - **Discord**: Discord interaction responses (stub, needs serenity in production)

pub mod console;
pub mod discord;
pub mod guild;

pub use console::ConsoleResponder;
pub use discord::{DiscordGateway, DiscordInteraction, InboundInteraction, OutboundAction};
pub use guild::StaticGuild;
