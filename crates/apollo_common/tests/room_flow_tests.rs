//! Room search flow against canned HTTP responses.

use apollo_common::config::RoomsConfig;
use apollo_common::rooms::{FixedClock, RoomSearch};
use apollo_common::store::MiniKarmaMode;
use apollo_common::FakeFetcher;
use chrono::NaiveDateTime;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const AUTOCOMPLETE: &str = "https://cms.test/autocomplete.json";
const THUMBS: &str = "https://search.test/map-thumbnail";
const WEEKS: &str = "https://tabula.test/weeks";

fn write_tables(dir: &Path) {
    fs::write(dir.join("room-mapname.json"), r#"{"msb101": "MSB1.01"}"#).unwrap();
    fs::write(
        dir.join("central-room-data.json"),
        r#"[{"name": "Maths", "rooms": [{"name": "MS.01", "url": "ms01"}]}]"#,
    )
    .unwrap();
    fs::write(dir.join("room_to_surl.json"), r#"{"MS.01": "MS.01"}"#).unwrap();
}

fn config(tmp: &TempDir, token: Option<&str>) -> RoomsConfig {
    let resource_dir = tmp.path().join("rooms");
    fs::create_dir_all(&resource_dir).unwrap();
    write_tables(&resource_dir);

    RoomsConfig {
        resource_dir,
        cache_dir: tmp.path().join("images"),
        map_api_token: token.map(str::to_string),
        autocomplete_url: AUTOCOMPLETE.to_string(),
        thumbnail_url: THUMBS.to_string(),
        term_weeks_url: WEEKS.to_string(),
        ..RoomsConfig::default()
    }
}

fn clock() -> Arc<FixedClock> {
    let now = NaiveDateTime::parse_from_str("2024-10-08 12:00", "%Y-%m-%d %H:%M").unwrap();
    Arc::new(FixedClock::new(now))
}

fn weeks() -> serde_json::Value {
    json!({"weeks": [
        {"academicYear": "24/25", "weekNumber": 2, "start": "2024-10-07", "end": "2024-10-13"}
    ]})
}

#[tokio::test]
async fn test_msb101_alias_and_building_dedup() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(FakeFetcher::new().with_json(
        AUTOCOMPLETE,
        json!([
            {"value": "MB1.01", "building": "Mathematical Sciences", "floor": "Floor 1", "id": 1, "w2gid": "a"},
            {"value": "MB1.01", "building": "Mathematical Sciences Building", "floor": "Floor 1", "id": 2, "w2gid": "b"}
        ]),
    ));
    let search = RoomSearch::init(&config(&tmp, Some("Token abc")), fake.clone(), clock()).unwrap();

    let rooms = search.search("msb101").await;

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].building_name, "Mathematical Sciences");
    let request = &fake.requests()[0];
    assert!(request.url.ends_with("?term=MSB1.01"), "url was {}", request.url);
    assert_eq!(
        request.headers,
        vec![("Authorization".to_string(), "Token abc".to_string())]
    );
}

#[tokio::test]
async fn test_unaliased_query_is_sent_trimmed() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(FakeFetcher::new().with_json(AUTOCOMPLETE, json!([])));
    let search = RoomSearch::init(&config(&tmp, None), fake.clone(), clock()).unwrap();

    assert!(search.search(" H0.52 ").await.is_empty());
    let request = &fake.requests()[0];
    assert!(request.url.ends_with("?term=H0.52"));
    assert!(request.headers.is_empty());
}

#[tokio::test]
async fn test_transport_failure_reads_as_not_found() {
    let tmp = TempDir::new().unwrap();
    let search = RoomSearch::init(&config(&tmp, None), Arc::new(FakeFetcher::new()), clock()).unwrap();
    assert!(search.search("anything").await.is_empty());
}

#[tokio::test]
async fn test_build_reply_fetches_thumbnail_once() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(
        FakeFetcher::new()
            .with_json(
                AUTOCOMPLETE,
                json!([{"value": "MS.01", "building": "Zeeman Building", "floor": "Floor 1", "id": 7, "w2gid": "z1"}]),
            )
            .with_json(WEEKS, weeks())
            .with_bytes(THUMBS, vec![0x89, 0x50]),
    );
    let search = RoomSearch::init(&config(&tmp, None), fake.clone(), clock()).unwrap();
    let room = search.search("ms01").await.remove(0);

    let first = search.build_reply(&room, MiniKarmaMode::Normal).await.unwrap();
    let second = search.build_reply(&room, MiniKarmaMode::Normal).await.unwrap();

    assert_eq!(fake.count(THUMBS), 1);
    assert_eq!(fake.count(WEEKS), 1);
    assert_eq!(first, second);
    assert_eq!(first.attachment.as_ref().unwrap().bytes, vec![0x89, 0x50]);
    assert!(first.field("Timetable:").unwrap().value.contains("wb 07 Oct"));
    assert!(search.thumbnails().is_cached("z1"));
}

#[tokio::test]
async fn test_room_without_timetable_skips_week_lookup() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(
        FakeFetcher::new()
            .with_json(
                AUTOCOMPLETE,
                json!([{"value": "H0.52", "building": "Humanities Building", "floor": "Floor 0", "w2gid": "h052"}]),
            )
            .with_bytes(THUMBS, vec![1]),
    );
    let search = RoomSearch::init(&config(&tmp, None), fake.clone(), clock()).unwrap();
    let room = search.search("h052").await.remove(0);

    for _ in 0..3 {
        let reply = search.build_reply(&room, MiniKarmaMode::Normal).await.unwrap();
        assert!(reply.field("Timetable:").is_none());
    }
    assert_eq!(fake.count(WEEKS), 0);
}

#[tokio::test]
async fn test_thumbnail_failure_aborts_reply() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(FakeFetcher::new().with_json(
        AUTOCOMPLETE,
        json!([{"value": "MS.01", "building": "Zeeman Building", "floor": "Floor 1", "w2gid": "z1"}]),
    ));
    let search = RoomSearch::init(&config(&tmp, None), fake, clock()).unwrap();
    let room = search.search("ms01").await.remove(0);

    assert!(search.build_reply(&room, MiniKarmaMode::Mini).await.is_err());
}

#[test]
fn test_missing_tables_fail_init() {
    let tmp = TempDir::new().unwrap();
    let config = RoomsConfig {
        resource_dir: tmp.path().join("nowhere"),
        cache_dir: tmp.path().join("images"),
        ..RoomsConfig::default()
    };
    assert!(RoomSearch::init(&config, Arc::new(FakeFetcher::new()), clock()).is_err());
}
