//! Activity listener: runs on every message, command or not.
//!
//! Records the author, then in guild channels reacts to the content: karma,
//! thanks and twitter link rewriting. Command messages only get the user
//! record.

pub mod karma;
pub mod thanks;

use crate::platform::{ChatPlatform, IncomingMessage};
use crate::state::BotState;
use anyhow::Result;
use apollo_common::store::UserActivity;
use apollo_shared::karma::has_karma_trigger;
use apollo_shared::links::rewrite_twitter_links;
use tracing::{debug, error, warn};

pub use karma::{apply_message_karma, karma_reply, KarmaOutcome};
pub use thanks::process_thanks;

/// Whether the listener looks at this author at all
pub fn is_tracked_author(state: &BotState, msg: &IncomingMessage) -> bool {
    !msg.author.bot || state.config.bot.irc_bridge_bot_ids.contains(&msg.author.id)
}

pub async fn on_message(state: &BotState, platform: &dyn ChatPlatform, msg: &IncomingMessage) -> Result<()> {
    if !is_tracked_author(state, msg) {
        return Ok(());
    }

    let recorded = state.with_store(|s| s.record_user_activity(msg.author.id, &msg.author.name, msg.created_at));
    match recorded {
        Ok(UserActivity::Created) => debug!("New user {} ({})", msg.author.name, msg.author.id),
        Ok(UserActivity::Seen) => {}
        Err(e) => {
            error!("Failed to record user {}: {:#}", msg.author.id, e);
            return Ok(());
        }
    }

    if !msg.in_guild() || state.is_command(&msg.content) {
        return Ok(());
    }

    if has_karma_trigger(&msg.content) {
        process_karma(state, platform, msg).await?;
    }

    if let Err(e) = process_thanks(platform, &state.config.bot.name, msg).await {
        warn!("Thanks check on {} failed: {}", msg.id, e);
    }

    process_links(platform, msg).await
}

async fn process_karma(state: &BotState, platform: &dyn ChatPlatform, msg: &IncomingMessage) -> Result<()> {
    let outcomes = match state.with_store(|s| apply_message_karma(s, msg, &state.config.karma)) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            error!("Karma for message {} failed: {:#}", msg.id, e);
            return Ok(());
        }
    };

    if let Some(reply) = karma_reply(&outcomes, state.channel_mode(msg.channel_id)) {
        platform.send_text(msg.channel_id, None, &reply).await?;
    }
    Ok(())
}

/// Reply with embed-friendly copies of twitter/x links and hide the
/// original previews
pub async fn process_links(platform: &dyn ChatPlatform, msg: &IncomingMessage) -> Result<()> {
    let Some(rewritten) = rewrite_twitter_links(&msg.content) else {
        return Ok(());
    };
    platform.suppress_embeds(msg.channel_id, msg.id).await?;
    platform.send_text(msg.channel_id, Some(msg.id), &rewritten).await?;
    Ok(())
}
