//! Apollo Daemon - campus room search and community chat bot
//!
//! Loads the room tables, opens the database and serves Discord events.

use anyhow::{Context, Result};
use apollo_common::config::Config;
use apollo_common::rooms::{RoomSearch, SystemClock};
use apollo_common::store::Store;
use apollo_common::ReqwestFetcher;
use apollo_shared::version::version_line;
use apollod::discord;
use apollod::state::BotState;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "apollod", version, about = "Apollo chat bot daemon")]
struct Args {
    /// Config file (default: $APOLLO_CONFIG, then ./apollo.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!("Apollo Daemon {} starting", version_line());

    let config = Config::load(args.config.as_deref())?;
    let token = config
        .bot
        .token
        .clone()
        .context("No Discord token: set DISCORD_TOKEN or [bot].token")?;

    let http = Arc::new(ReqwestFetcher::new(config.rooms.http_timeout())?);
    let rooms = RoomSearch::init(&config.rooms, http, Arc::new(SystemClock))
        .context("Failed to load room search data")?;
    let store = Store::open_at(&config.bot.database_path)
        .with_context(|| format!("Failed to open {}", config.bot.database_path.display()))?;

    let state = Arc::new(BotState::new(config, rooms, store));
    info!("Apollo Daemon ready");

    discord::run(&token, state).await
}
