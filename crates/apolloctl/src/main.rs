//! Apollo Control - admin CLI for the Apollo bot
//!
//! Runs room lookups against the live campus APIs and manages the bot's
//! SQLite database directly.

use anyhow::{Context, Result};
use apollo_common::config::{Config, LOCAL_CONFIG_PATH};
use apollo_common::store::Store;
use apolloctl::commands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// Version is embedded at build time
const VERSION: &str = env!("APOLLO_VERSION");

#[derive(Parser)]
#[command(name = "apolloctl")]
#[command(about = "Apollo bot administration", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// Config file (default: $APOLLO_CONFIG, then ./apollo.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a room and print the reply the bot would send
    Room {
        /// Room name, alias or partial name
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Choose the Nth candidate when the search is ambiguous
        #[arg(long)]
        pick: Option<usize>,

        /// Render as in a mini karma channel
        #[arg(long)]
        mini: bool,
    },

    /// Manage the command blacklist and channel modes
    Channel {
        #[command(subcommand)]
        action: ChannelAction,
    },

    /// Query karma
    Karma {
        #[command(subcommand)]
        action: KarmaAction,
    },

    /// Query user records
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Write a default config file
    Init {
        #[arg(default_value = LOCAL_CONFIG_PATH)]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum ChannelAction {
    /// Disable commands in a channel for non-exec users
    Ignore {
        channel: u64,
        /// User id recorded as having added the channel
        #[arg(long, default_value_t = 0)]
        by: u64,
    },
    /// Re-enable commands in a channel
    Unignore { channel: u64 },
    /// List ignored channels
    List,
    /// Show or set mini karma mode
    Mini {
        channel: u64,
        #[arg(value_parser = ["on", "off"])]
        state: Option<String>,
    },
}

#[derive(Subcommand)]
enum KarmaAction {
    /// Show one topic
    Show { topic: String },
    /// Highest scoring topics
    Top {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Show a user record
    Show { uid: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let Cli { config, command } = Cli::parse();
    let load = || Config::load(config.as_deref());

    let output = match command {
        Commands::Init { path } => commands::config_init(&path)?,
        Commands::Room { query, pick, mini } => {
            commands::room(&load()?, &query.join(" "), pick, mini).await?
        }
        Commands::Channel { action } => {
            let store = open_store(&load()?)?;
            match action {
                ChannelAction::Ignore { channel, by } => commands::ignore_channel(&store, channel, by)?,
                ChannelAction::Unignore { channel } => commands::unignore_channel(&store, channel)?,
                ChannelAction::List => commands::list_channels(&store)?,
                ChannelAction::Mini { channel, state } => {
                    commands::mini_mode(&store, channel, state.map(|s| s == "on"))?
                }
            }
        }
        Commands::Karma { action } => {
            let store = open_store(&load()?)?;
            match action {
                KarmaAction::Show { topic } => commands::karma_show(&store, &topic)?,
                KarmaAction::Top { limit } => commands::karma_top(&store, limit)?,
            }
        }
        Commands::User { action } => {
            let store = open_store(&load()?)?;
            match action {
                UserAction::Show { uid } => commands::user_show(&store, uid)?,
            }
        }
    };

    println!("{}", output);
    Ok(())
}

fn open_store(config: &Config) -> Result<Store> {
    Store::open_at(&config.bot.database_path)
        .with_context(|| format!("Failed to open {}", config.bot.database_path.display()))
}
