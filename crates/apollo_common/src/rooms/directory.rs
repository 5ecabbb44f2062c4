//! Static room lookup tables.
//!
//! Three JSON files in the resource directory, loaded once at startup:
//! - `room-mapname.json`: alias → canonical search token
//! - `central-room-data.json`: buildings with their centrally timetabled rooms
//! - `room_to_surl.json`: room display name → timetable id

use apollo_shared::room::normalize_room_query;
use apollo_shared::ApolloError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const ALIASES_FILE: &str = "room-mapname.json";
pub const CENTRAL_ROOMS_FILE: &str = "central-room-data.json";
pub const TIMETABLE_FILE: &str = "room_to_surl.json";

#[derive(Debug, Deserialize)]
struct CentralBuilding {
    #[serde(default)]
    rooms: Vec<CentralRoom>,
}

#[derive(Debug, Deserialize)]
struct CentralRoom {
    name: String,
    url: String,
}

/// Read-only room tables
#[derive(Debug, Clone, Default)]
pub struct RoomDirectory {
    aliases: HashMap<String, String>,
    central: HashMap<String, String>,
    timetable: HashMap<String, String>,
}

impl RoomDirectory {
    /// Load all three tables from `dir`
    pub fn load(dir: &Path) -> Result<Self, ApolloError> {
        let aliases: HashMap<String, String> = read_json(&dir.join(ALIASES_FILE))?;
        let buildings: Vec<CentralBuilding> = read_json(&dir.join(CENTRAL_ROOMS_FILE))?;
        let timetable: HashMap<String, String> = read_json(&dir.join(TIMETABLE_FILE))?;

        let directory = Self::from_parts(aliases, central_index(buildings), timetable);
        info!(
            "Room directory loaded: {} aliases, {} central rooms, {} timetabled rooms",
            directory.aliases.len(),
            directory.central.len(),
            directory.timetable.len()
        );
        Ok(directory)
    }

    /// Build from in-memory tables. Alias keys are normalized.
    pub fn from_parts(
        aliases: HashMap<String, String>,
        central: HashMap<String, String>,
        timetable: HashMap<String, String>,
    ) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(k, v)| (normalize_room_query(&k), v))
            .collect();
        Self {
            aliases,
            central,
            timetable,
        }
    }

    /// The text sent to the autocomplete API for a user query
    pub fn search_token<'a>(&'a self, query: &'a str) -> &'a str {
        self.aliases
            .get(&normalize_room_query(query))
            .map(String::as_str)
            .unwrap_or_else(|| query.trim())
    }

    /// Room information path for a centrally timetabled room
    pub fn central_info(&self, display_name: &str) -> Option<&str> {
        self.central.get(display_name).map(String::as_str)
    }

    pub fn timetable_id(&self, display_name: &str) -> Option<&str> {
        self.timetable.get(display_name).map(String::as_str)
    }
}

/// Flatten buildings into name → url. The first building listing a room wins.
fn central_index(buildings: Vec<CentralBuilding>) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for room in buildings.into_iter().flat_map(|b| b.rooms) {
        index.entry(room.name).or_insert(room.url);
    }
    index
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ApolloError> {
    let resource_err = |reason: String| ApolloError::Resource {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| resource_err(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| resource_err(e.to_string()))
}
