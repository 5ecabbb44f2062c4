//! Command handlers for `room` and `roompr`.

use anyhow::Result;
use apollo_common::rooms::{NOT_FOUND_TEXT, ROOMPR_TEXT};
use tracing::{debug, info};

use crate::platform::{ChatPlatform, IncomingMessage};
use crate::prompt::choose_room;
use crate::state::BotState;

pub const ROOM_USAGE: &str = "Usage: `!room <name>`";

/// Look a room up and reply with its card.
///
/// Nothing is sent when a disambiguation prompt goes unanswered.
pub async fn handle_room(
    state: &BotState,
    platform: &dyn ChatPlatform,
    msg: &IncomingMessage,
    query: &str,
) -> Result<()> {
    let channel = msg.channel_id;
    if query.trim().is_empty() {
        platform.send_text(channel, Some(msg.id), ROOM_USAGE).await?;
        return Ok(());
    }

    let mut rooms = state.rooms.search(query).await;
    let room = match rooms.len() {
        0 => {
            debug!("No room matches {:?}", query);
            platform.send_text(channel, Some(msg.id), NOT_FOUND_TEXT).await?;
            return Ok(());
        }
        1 => rooms.remove(0),
        _ => {
            let timeout = state.config.rooms.prompt_timeout();
            match choose_room(platform, msg, &rooms, timeout).await? {
                Some(room) => room,
                None => return Ok(()),
            }
        }
    };

    info!("Room search {:?} -> {} ({})", query, room.display_name, room.building_name);
    let reply = state.rooms.build_reply(&room, state.channel_mode(channel)).await?;
    platform.send_reply(channel, msg.id, &reply).await?;
    Ok(())
}

pub async fn handle_roompr(platform: &dyn ChatPlatform, msg: &IncomingMessage) -> Result<()> {
    platform.send_text(msg.channel_id, Some(msg.id), ROOMPR_TEXT).await?;
    Ok(())
}
