//! apolloctl command implementations.
//!
//! Store commands are synchronous and return the text to print. `room` talks
//! to the live campus APIs.

use anyhow::{bail, Context, Result};
use apollo_common::config::Config;
use apollo_common::rooms::{RoomSearch, SystemClock, NOT_FOUND_TEXT};
use apollo_common::store::{MiniKarmaMode, Store};
use apollo_common::ReqwestFetcher;
use std::path::Path;
use std::sync::Arc;

use crate::display;

/// Resolve a room and render its reply, or the candidate list when
/// ambiguous and no pick was given. `pick` is 1-based.
pub async fn room(config: &Config, query: &str, pick: Option<usize>, mini: bool) -> Result<String> {
    let http = Arc::new(ReqwestFetcher::new(config.rooms.http_timeout())?);
    let search = RoomSearch::init(&config.rooms, http, Arc::new(SystemClock))
        .context("Failed to load room search data")?;

    let mut rooms = search.search(query).await;
    let room = match (rooms.len(), pick) {
        (0, _) => return Ok(NOT_FOUND_TEXT.to_string()),
        (1, None) => rooms.remove(0),
        (_, None) => return Ok(display::render_candidates(&rooms)),
        (n, Some(p)) if p == 0 || p > n => bail!("--pick must be between 1 and {}", n),
        (_, Some(p)) => rooms.remove(p - 1),
    };

    let mode = if mini { MiniKarmaMode::Mini } else { MiniKarmaMode::Normal };
    let reply = search.build_reply(&room, mode).await?;
    Ok(format!(
        "{}\n\n{}",
        display::render_reply(&reply),
        search.thumbnails().path_for(&room.map_id).display()
    ))
}

pub fn ignore_channel(store: &Store, channel: u64, added_by: u64) -> Result<String> {
    Ok(if store.ignore_channel(channel, added_by)? {
        format!("Commands disabled in channel {}", channel)
    } else {
        format!("Channel {} was already ignored", channel)
    })
}

pub fn unignore_channel(store: &Store, channel: u64) -> Result<String> {
    Ok(if store.unignore_channel(channel)? {
        format!("Commands enabled in channel {}", channel)
    } else {
        format!("Channel {} was not ignored", channel)
    })
}

pub fn list_channels(store: &Store) -> Result<String> {
    Ok(display::render_channels(&store.ignored_channels()?))
}

/// Show or set a channel's mini karma mode
pub fn mini_mode(store: &Store, channel: u64, enable: Option<bool>) -> Result<String> {
    if let Some(enable) = enable {
        let mode = if enable { MiniKarmaMode::Mini } else { MiniKarmaMode::Normal };
        store.set_mini_karma_mode(channel, mode)?;
    }
    Ok(display::render_mode(channel, store.mini_karma_mode(channel)?))
}

pub fn karma_show(store: &Store, topic: &str) -> Result<String> {
    let topic = topic.trim().to_lowercase();
    Ok(match store.karma(&topic)? {
        Some(record) => display::render_karma(&record),
        None => format!("No karma recorded for {}", topic),
    })
}

pub fn karma_top(store: &Store, limit: usize) -> Result<String> {
    Ok(display::render_leaderboard(&store.top_karma(limit)?))
}

pub fn user_show(store: &Store, uid: u64) -> Result<String> {
    Ok(match store.get_user(uid)? {
        Some(user) => display::render_user(&user),
        None => format!("No user with uid {}", uid),
    })
}

pub fn config_init(path: &Path) -> Result<String> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    Config::save_default(path)?;
    Ok(format!("Wrote default config to {}", path.display()))
}
