//! Tests for autocomplete response cleaning.

use apollo_shared::room::{
    candidates_from_response, normalize_room_query, remove_duplicate_building, RoomCandidate,
    MSB_COPY, MSB_ORIGINAL,
};
use serde_json::json;

fn room(name: &str, building: &str, map_id: &str) -> RoomCandidate {
    RoomCandidate {
        display_name: name.to_string(),
        building_name: building.to_string(),
        floor_label: "Floor 1".to_string(),
        map_id: map_id.to_string(),
        cms_id: None,
    }
}

#[test]
fn test_entries_without_map_id_are_dropped() {
    let response = json!([
        {"value": "L3", "building": "Science Concourse", "floor": "Floor 0", "id": 1, "w2gid": "a"},
        {"value": "L4", "building": "Science Concourse", "floor": "Floor 0", "id": 2},
        {"value": "L5", "building": "Science Concourse", "floor": "Floor 0", "id": 3, "w2gid": null}
    ]);

    let rooms = candidates_from_response(&response);
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].display_name, "L3");
}

#[test]
fn test_copy_building_is_removed_when_original_exists() {
    let response = json!([
        {"value": "MSB1.01", "building": MSB_COPY, "floor": "Floor 1", "id": 10, "w2gid": "copy"},
        {"value": "MSB1.01", "building": MSB_ORIGINAL, "floor": "Floor 1", "id": 11, "w2gid": "orig"}
    ]);

    let rooms = candidates_from_response(&response);
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].building_name, MSB_ORIGINAL);
    assert_eq!(rooms[0].map_id, "orig");
}

#[test]
fn test_copy_without_original_is_kept() {
    let rooms = vec![
        room("MSB2.22", MSB_COPY, "x"),
        room("MSB1.01", MSB_ORIGINAL, "y"),
    ];
    let rooms = remove_duplicate_building(rooms, MSB_ORIGINAL, MSB_COPY);
    assert_eq!(rooms.len(), 2);
}

#[test]
fn test_order_is_preserved() {
    let rooms = vec![
        room("A", "Zeeman", "1"),
        room("MSB1.01", MSB_COPY, "2"),
        room("B", "Zeeman", "3"),
        room("MSB1.01", MSB_ORIGINAL, "4"),
    ];
    let names: Vec<_> = remove_duplicate_building(rooms, MSB_ORIGINAL, MSB_COPY)
        .into_iter()
        .map(|r| r.map_id)
        .collect();
    assert_eq!(names, vec!["1", "3", "4"]);
}

#[test]
fn test_non_array_response_is_empty() {
    assert!(candidates_from_response(&json!({"error": "nope"})).is_empty());
}

#[test]
fn test_normalize_is_case_space_dot_insensitive() {
    assert_eq!(normalize_room_query("MSB1.01"), normalize_room_query("msb 101"));
    assert_eq!(normalize_room_query("Ms . 01"), "ms01");
}

#[test]
fn test_choice_line() {
    let r = room("MS.01", "Zeeman Building", "z");
    assert_eq!(r.choice_line(), "MS.01 in **Zeeman Building** Floor 1");
}
