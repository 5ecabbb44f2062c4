//! Bot state shared by every message handler.

use anyhow::{anyhow, Result};
use apollo_common::config::Config;
use apollo_common::rooms::RoomSearch;
use apollo_common::store::{MiniKarmaMode, Store};
use std::sync::{Arc, Mutex};
use tracing::warn;

pub struct BotState {
    pub config: Config,
    pub rooms: RoomSearch,
    store: Mutex<Store>,
}

impl BotState {
    pub fn new(config: Config, rooms: RoomSearch, store: Store) -> Self {
        Self {
            config,
            rooms,
            store: Mutex::new(store),
        }
    }

    /// Run `f` with exclusive access to the store. Never call across an await.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut Store) -> Result<R>) -> Result<R> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| anyhow!("store lock poisoned"))?;
        f(&mut store)
    }

    /// Channel display mode; store errors fall back to normal
    pub fn channel_mode(&self, channel: u64) -> MiniKarmaMode {
        self.with_store(|s| s.mini_karma_mode(channel))
            .unwrap_or_else(|e| {
                warn!("Mini karma lookup for channel {} failed: {}", channel, e);
                MiniKarmaMode::Normal
            })
    }

    pub fn is_command(&self, content: &str) -> bool {
        self.config
            .bot
            .command_prefixes
            .iter()
            .any(|prefix| content.starts_with(prefix.as_str()))
    }
}

/// Handle shared between the gateway handler and spawned tasks
pub type SharedState = Arc<BotState>;
