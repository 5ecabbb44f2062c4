//! Room candidates returned by the campus map autocomplete API.
//!
//! The API answers with a JSON array of loosely-typed objects:
//!
//! ```json
//! [{"value": "MS.01", "building": "Zeeman Building", "floor": "Floor 1",
//!   "id": 39617, "w2gid": "3fdf6a4f"}]
//! ```
//!
//! `w2gid` is the map object identifier (also the thumbnail key). Entries
//! where it is null or missing are dropped. `id` is the campus map CMS id used
//! for the "open on the map" link.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Building name the API reports for genuine Mathematical Sciences rooms.
pub const MSB_ORIGINAL: &str = "Mathematical Sciences";

/// Building name of the duplicated Mathematical Sciences entries.
pub const MSB_COPY: &str = "Mathematical Sciences Building";

/// A single search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCandidate {
    /// Room display name, e.g. "MS.01"
    pub display_name: String,
    pub building_name: String,
    pub floor_label: String,
    /// Map object id (`w2gid`)
    pub map_id: String,
    /// Campus map CMS id (`id`), used for the map link
    pub cms_id: Option<String>,
}

impl RoomCandidate {
    /// Build a candidate from one autocomplete entry.
    ///
    /// Returns `None` when the entry has no map identifier.
    pub fn from_api(entry: &Value) -> Option<Self> {
        let map_id = scalar_to_string(entry.get("w2gid")?)?;
        Some(Self {
            display_name: field_or_empty(entry, "value"),
            building_name: field_or_empty(entry, "building"),
            floor_label: field_or_empty(entry, "floor"),
            map_id,
            cms_id: entry
                .get("id")
                .and_then(scalar_to_string)
                .filter(|id| !id.is_empty()),
        })
    }

    /// One line for the disambiguation list
    pub fn choice_line(&self) -> String {
        format!(
            "{} in **{}** {}",
            self.display_name, self.building_name, self.floor_label
        )
    }
}

fn field_or_empty(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

/// Strings are taken as-is, numbers are stringified, anything else is absent.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize free text the way alias keys are stored: no spaces, no dots,
/// lowercase.
pub fn normalize_room_query(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ' ' && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Turn a raw autocomplete response into the candidate list.
///
/// Non-array responses yield nothing. Entries lacking a map id are dropped,
/// then the duplicated Mathematical Sciences entries are removed.
pub fn candidates_from_response(response: &Value) -> Vec<RoomCandidate> {
    let rooms: Vec<RoomCandidate> = response
        .as_array()
        .map(|entries| entries.iter().filter_map(RoomCandidate::from_api).collect())
        .unwrap_or_default();

    remove_duplicate_building(rooms, MSB_ORIGINAL, MSB_COPY)
}

/// Remove `copy` building entries shadowed by an `original` entry with the
/// same display name. Each original removes at most one copy.
pub fn remove_duplicate_building(
    mut rooms: Vec<RoomCandidate>,
    original: &str,
    copy: &str,
) -> Vec<RoomCandidate> {
    let originals: Vec<String> = rooms
        .iter()
        .filter(|r| r.building_name == original)
        .map(|r| r.display_name.clone())
        .collect();

    for name in originals {
        if let Some(pos) = rooms
            .iter()
            .position(|r| r.building_name == copy && r.display_name == name)
        {
            rooms.remove(pos);
        }
    }
    rooms
}
