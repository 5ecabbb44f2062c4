//! Reacting to thanks aimed at the bot.

use crate::platform::{ChatPlatform, IncomingMessage};
use anyhow::Result;
use apollo_shared::thanks::{contains_thanks, mentions_bot_name};
use apollo_shared::THANKS_REACTION;
use tracing::debug;

/// React with a heart if `msg` thanks the bot. Returns whether it reacted.
///
/// A reply must reply to the bot; any other message must follow a bot
/// message or name the bot.
pub async fn process_thanks(platform: &dyn ChatPlatform, bot_name: &str, msg: &IncomingMessage) -> Result<bool> {
    if !contains_thanks(&msg.content) {
        return Ok(false);
    }
    let bot_id = platform.bot_user_id();
    if msg.author.id == bot_id {
        return Ok(false);
    }

    let addressed = match &msg.reply_to {
        Some(reference) => {
            let author = match reference.author_id {
                Some(author) => Some(author),
                None => platform.message_author(msg.channel_id, reference.message_id).await?,
            };
            author == Some(bot_id)
        }
        None => {
            let previous = platform.previous_message_author(msg.channel_id, msg.id).await?;
            previous == Some(bot_id) || mentions_bot_name(&msg.content, bot_name)
        }
    };
    if !addressed {
        return Ok(false);
    }

    debug!("Thanked by {} in {}", msg.author.id, msg.channel_id);
    platform.add_reaction(msg.channel_id, msg.id, THANKS_REACTION).await?;
    Ok(true)
}
