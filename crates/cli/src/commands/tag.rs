//! `tagbot tag` — Run the `/tag` command against the console.

use std::sync::Arc;

use tagbot_channels::{ConsoleResponder, StaticGuild};
use tagbot_config::AppConfig;
use tagbot_core::interaction::{InvocationContext, UserRef};
use tagbot_tags::CommandOutcome;
use tracing::debug;

/// Channel id used for local invocations.
const LOCAL_CHANNEL_ID: &str = "local";

pub struct TagRequest {
    pub id: String,
    pub channel: String,
    pub thread_of: Option<String>,
    pub roles: Vec<String>,
    pub reply_to: Option<String>,
}

pub async fn run(request: TagRequest) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let command = super::build_tag_command(&config)?;
    let guild = StaticGuild::from_config(&config.discord);
    let ctx = invocation(request);

    let outcome = command
        .on_slash_command(&ctx, &guild, Arc::new(ConsoleResponder::new()))
        .await?;

    // The console has to stay up until previews land
    if let CommandOutcome::Deferred(pending) = outcome {
        debug!(links = pending.link_count(), "Waiting for link previews");
        pending.wait().await?;
    }

    Ok(())
}

fn invocation(request: TagRequest) -> InvocationContext {
    let TagRequest {
        id,
        channel,
        thread_of,
        roles,
        reply_to,
    } = request;

    let mut ctx = match thread_of {
        Some(parent) => InvocationContext::in_thread(LOCAL_CHANNEL_ID, channel, parent, id),
        None => InvocationContext::in_channel(LOCAL_CHANNEL_ID, channel, id),
    };
    for role in roles {
        ctx = ctx.with_role(role);
    }
    if let Some(user) = reply_to.as_deref().map(parse_user) {
        ctx = ctx.with_reply_to(user);
    }
    ctx
}

/// `ID:NAME`, or a bare id used as both.
fn parse_user(spec: &str) -> UserRef {
    match spec.split_once(':') {
        Some((id, name)) => UserRef::new(id, name),
        None => UserRef::new(spec, spec),
    }
}
