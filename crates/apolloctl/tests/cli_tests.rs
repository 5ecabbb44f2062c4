//! Store-backed apolloctl commands against a temporary database.

use apollo_common::store::{KarmaChange, Store};
use apollo_shared::karma::{KarmaItem, KarmaOp};
use apolloctl::commands;
use chrono::Utc;
use tempfile::TempDir;

fn store(tmp: &TempDir) -> Store {
    Store::open_at(tmp.path().join("apollo.db")).unwrap()
}

#[test]
fn test_channel_ignore_cycle() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);

    assert_eq!(commands::ignore_channel(&store, 123, 9).unwrap(), "Commands disabled in channel 123");
    assert_eq!(commands::ignore_channel(&store, 123, 9).unwrap(), "Channel 123 was already ignored");
    assert!(commands::list_channels(&store).unwrap().contains("123  added by 9"));

    assert_eq!(commands::unignore_channel(&store, 123).unwrap(), "Commands enabled in channel 123");
    assert_eq!(commands::unignore_channel(&store, 123).unwrap(), "Channel 123 was not ignored");
}

#[test]
fn test_mini_mode_toggle() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);

    assert!(commands::mini_mode(&store, 5, None).unwrap().contains("normal"));
    assert!(commands::mini_mode(&store, 5, Some(true)).unwrap().contains("mini"));
    assert!(commands::mini_mode(&store, 5, Some(false)).unwrap().contains("normal"));
}

#[test]
fn test_karma_and_user_queries() {
    let tmp = TempDir::new().unwrap();
    let mut store = store(&tmp);
    let item = KarmaItem {
        topic: "rust".to_string(),
        op: KarmaOp::Plus,
        reason: None,
    };
    store
        .apply_karma(&KarmaChange { user_uid: 1, message_id: 2, item: &item, at: Utc::now() })
        .unwrap();
    store.record_user_activity(1, "ferris", Utc::now()).unwrap();

    assert!(commands::karma_show(&store, " Rust ").unwrap().contains("rust"));
    assert_eq!(commands::karma_show(&store, "go").unwrap(), "No karma recorded for go");
    assert!(commands::karma_top(&store, 5).unwrap().contains("1. rust"));
    assert!(commands::user_show(&store, 1).unwrap().contains("ferris"));
    assert_eq!(commands::user_show(&store, 2).unwrap(), "No user with uid 2");
}

#[test]
fn test_config_init_refuses_overwrite() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("apollo.toml");

    assert!(commands::config_init(&path).unwrap().starts_with("Wrote default config"));
    assert!(commands::config_init(&path).is_err());
}
