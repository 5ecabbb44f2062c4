//! Reaction-based disambiguation between several room candidates.
//!
//! Two futures run side by side: one attaches the numbered reactions, the
//! other waits for the requester's pick. A quick reaction is therefore seen
//! even while the reactions are still being added. The waiter finishes first
//! on a match or timeout; it then deletes the prompt and tells the attacher to
//! stop.

use crate::platform::{ChatPlatform, IncomingMessage};
use anyhow::Result;
use apollo_shared::{RoomCandidate, CHOICE_SYMBOLS};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

pub const PROMPT_HEADER: &str = "Multiple rooms exist with that name. Which do you want?:";

/// Prompt text for the offered rooms, one numbered line each
pub fn prompt_text(rooms: &[RoomCandidate]) -> String {
    let mut text = PROMPT_HEADER.to_string();
    for (symbol, room) in CHOICE_SYMBOLS.iter().zip(rooms) {
        text.push_str(&format!("\n\t{} {}", symbol, room.choice_line()));
    }
    text
}

/// Ask the author of `request` to pick one of `rooms`.
///
/// Only the first ten rooms can be offered. Returns `Ok(None)` when nobody
/// picked in time or the prompt went away; the caller sends nothing further.
pub async fn choose_room(
    platform: &dyn ChatPlatform,
    request: &IncomingMessage,
    rooms: &[RoomCandidate],
    timeout: Duration,
) -> Result<Option<RoomCandidate>> {
    let offered = &rooms[..rooms.len().min(CHOICE_SYMBOLS.len())];
    if offered.len() < rooms.len() {
        debug!("Offering {} of {} rooms", offered.len(), rooms.len());
    }
    let symbols = &CHOICE_SYMBOLS[..offered.len()];

    let channel = request.channel_id;
    let prompt = platform.send_text(channel, None, &prompt_text(offered)).await?;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let attach = async {
        let add_all = async {
            for symbol in symbols {
                if let Err(e) = platform.add_reaction(channel, prompt, symbol).await {
                    debug!("Stopped adding reactions to prompt {}: {}", prompt, e);
                    break;
                }
            }
        };
        tokio::select! {
            _ = add_all => {}
            _ = stop_rx => {}
        }
    };

    let wait = async {
        let picked = platform
            .await_reaction(channel, prompt, request.author.id, symbols, timeout)
            .await;
        let _ = stop_tx.send(());
        if let Err(e) = platform.delete_message(channel, prompt).await {
            debug!("Prompt {} already gone: {}", prompt, e);
        }
        picked
    };

    let (_, picked) = tokio::join!(attach, wait);

    let symbol = match picked {
        Ok(Some(symbol)) => symbol,
        Ok(None) => {
            info!("Room choice timed out for user {}", request.author.id);
            return Ok(None);
        }
        Err(e) => {
            warn!("Waiting for room choice failed: {}", e);
            return Ok(None);
        }
    };

    Ok(symbols
        .iter()
        .position(|s| *s == symbol)
        .map(|index| offered[index].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str) -> RoomCandidate {
        RoomCandidate {
            display_name: name.to_string(),
            building_name: "Oculus".to_string(),
            floor_label: "Floor 0".to_string(),
            map_id: name.to_lowercase(),
            cms_id: None,
        }
    }

    #[test]
    fn test_prompt_text_lines() {
        let text = prompt_text(&[room("OC0.01"), room("OC0.02")]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], PROMPT_HEADER);
        assert_eq!(lines[1], "\t1\u{fe0f}\u{20e3} OC0.01 in **Oculus** Floor 0");
        assert_eq!(lines[2], "\t2\u{20e3} OC0.02 in **Oculus** Floor 0");
    }
}
