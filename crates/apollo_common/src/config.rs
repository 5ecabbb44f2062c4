//! Configuration management for Apollo.
//!
//! Loads settings from a TOML file or uses defaults. Every field has a
//! default so partial files are valid. Secrets can come from the environment
//! instead of the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "APOLLO_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_PATH: &str = "apollo.toml";

/// Environment override for the bot token
pub const DISCORD_TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Environment override for the campus map API token
pub const MAP_TOKEN_ENV: &str = "APOLLO_MAP_API_TOKEN";

/// Chat bot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Discord bot token
    #[serde(default)]
    pub token: Option<String>,

    /// Prefixes that mark a message as a command
    #[serde(default = "default_command_prefixes")]
    pub command_prefixes: Vec<String>,

    /// Roles whose holders may use commands in blacklisted channels
    #[serde(default)]
    pub exec_role_ids: Vec<u64>,

    /// Bridge bots whose messages are treated like user messages
    #[serde(default)]
    pub irc_bridge_bot_ids: Vec<u64>,

    /// Name the bot answers to in thanks detection
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// SQLite database path
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_command_prefixes() -> Vec<String> {
    vec!["!".to_string()]
}

fn default_bot_name() -> String {
    "apollo".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("apollo.db")
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            command_prefixes: default_command_prefixes(),
            exec_role_ids: Vec::new(),
            irc_bridge_bot_ids: Vec::new(),
            name: default_bot_name(),
            database_path: default_database_path(),
        }
    }
}

/// Room search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomsConfig {
    /// Directory holding the static room JSON tables
    #[serde(default = "default_resource_dir")]
    pub resource_dir: PathBuf,

    /// Thumbnail cache directory
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Authorization header value for the campus map API ("Token ...").
    /// Defaults to the token the public campus map frontend uses.
    #[serde(default = "default_map_api_token")]
    pub map_api_token: Option<String>,

    #[serde(default = "default_autocomplete_url")]
    pub autocomplete_url: String,

    /// Thumbnail endpoint, the map id is appended
    #[serde(default = "default_thumbnail_url")]
    pub thumbnail_url: String,

    #[serde(default = "default_term_weeks_url")]
    pub term_weeks_url: String,

    /// Campus map page, `?cmsid=<id>` is appended
    #[serde(default = "default_campus_map_url")]
    pub campus_map_url: String,

    /// Central room information pages, the room's path is appended
    #[serde(default = "default_room_info_url")]
    pub room_info_url: String,

    /// Timetabling host
    #[serde(default = "default_timetable_url")]
    pub timetable_url: String,

    /// How long a disambiguation prompt waits for a reaction
    #[serde(default = "default_prompt_timeout")]
    pub prompt_timeout_secs: u64,

    /// Per-request HTTP timeout
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_resource_dir() -> PathBuf {
    PathBuf::from("resources/rooms")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("resources/rooms/images")
}

fn default_autocomplete_url() -> String {
    "https://campus-cms.warwick.ac.uk/api/v1/projects/1/autocomplete.json".to_string()
}

fn default_thumbnail_url() -> String {
    "https://search.warwick.ac.uk/api/map-thumbnail".to_string()
}

fn default_term_weeks_url() -> String {
    "https://tabula.warwick.ac.uk/api/v1/termdates/weeks".to_string()
}

fn default_campus_map_url() -> String {
    "https://campus.warwick.ac.uk/".to_string()
}

fn default_room_info_url() -> String {
    "https://warwick.ac.uk/services/its/servicessupport/av/lecturerooms/roominformation".to_string()
}

fn default_timetable_url() -> String {
    "https://timetablingmanagement.warwick.ac.uk".to_string()
}

fn default_map_api_token() -> Option<String> {
    Some("Token 3a08c5091e5e477faa6ea90e4ae3e6c3".to_string())
}

fn default_prompt_timeout() -> u64 {
    30
}

fn default_http_timeout() -> u64 {
    10
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            resource_dir: default_resource_dir(),
            cache_dir: default_cache_dir(),
            map_api_token: default_map_api_token(),
            autocomplete_url: default_autocomplete_url(),
            thumbnail_url: default_thumbnail_url(),
            term_weeks_url: default_term_weeks_url(),
            campus_map_url: default_campus_map_url(),
            room_info_url: default_room_info_url(),
            timetable_url: default_timetable_url(),
            prompt_timeout_secs: default_prompt_timeout(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl RoomsConfig {
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Karma settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KarmaConfig {
    /// Minutes before a user may change the same topic again
    #[serde(default = "default_karma_timeout")]
    pub timeout_mins: i64,

    /// Most karma changes applied from a single message
    #[serde(default = "default_max_changes")]
    pub max_changes: usize,
}

fn default_karma_timeout() -> i64 {
    5
}

fn default_max_changes() -> usize {
    5
}

impl Default for KarmaConfig {
    fn default() -> Self {
        Self {
            timeout_mins: default_karma_timeout(),
            max_changes: default_max_changes(),
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub rooms: RoomsConfig,

    #[serde(default)]
    pub karma: KarmaConfig,
}

impl Config {
    /// Load config: explicit path, then `$APOLLO_CONFIG`, then `./apollo.toml`,
    /// then the user config dir, then defaults. Environment secrets are
    /// applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => Self::candidate_paths()
                .into_iter()
                .find(|p| p.exists())
                .map(|p| Self::load_from_path(&p))
                .transpose()?
                .unwrap_or_else(|| {
                    warn!("Config not found, using defaults");
                    Config::default()
                }),
        };
        config.apply_env();
        Ok(config)
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from(LOCAL_CONFIG_PATH));
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("apollo").join("apollo.toml"));
        }
        paths
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(DISCORD_TOKEN_ENV) {
            self.bot.token = Some(token);
        }
        if let Ok(token) = std::env::var(MAP_TOKEN_ENV) {
            self.rooms.map_api_token = Some(token);
        }
    }

    /// Write the default config to `path` (for first-time setup)
    pub fn save_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        info!("Wrote default config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [bot]
            command_prefixes = ["!", "?"]

            [karma]
            timeout_mins = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.bot.command_prefixes, vec!["!", "?"]);
        assert_eq!(config.bot.name, "apollo");
        assert_eq!(config.karma.timeout_mins, 10);
        assert_eq!(config.karma.max_changes, 5);
        assert_eq!(config.rooms.prompt_timeout(), Duration::from_secs(30));
        assert_eq!(config.rooms.map_api_token, default_map_api_token());
    }

    #[test]
    fn test_map_api_token_can_be_overridden() {
        let config: Config = toml::from_str(
            r#"
            [rooms]
            map_api_token = "Token own"
            "#,
        )
        .unwrap();
        assert_eq!(config.rooms.map_api_token.as_deref(), Some("Token own"));
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apollo.toml");
        Config::save_default(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.rooms.autocomplete_url, default_autocomplete_url());
        assert_eq!(loaded.bot.database_path, default_database_path());
    }
}
