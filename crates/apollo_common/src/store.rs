//! SQLite store for users, karma and per-channel settings.
//!
//! Schema:
//! - users: one row per chat user, first/last seen
//! - ignored_channels: channels where commands are disabled for non-exec users
//! - channel_settings: per-channel flags (mini karma mode)
//! - karma / karma_changes: topic totals and the change log
//!
//! Chat ids are snowflakes stored as INTEGER.

use anyhow::Result;
use apollo_shared::karma::{KarmaItem, KarmaOp};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_uid: u64,
    pub username: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// What `record_user_activity` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserActivity {
    Created,
    Seen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredChannel {
    pub channel: u64,
    pub added_by: u64,
    pub added_at: DateTime<Utc>,
}

/// How verbose karma-related output is in a channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiniKarmaMode {
    #[default]
    Normal,
    Mini,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KarmaRecord {
    pub name: String,
    pub pluses: i64,
    pub minuses: i64,
    pub neutrals: i64,
}

impl KarmaRecord {
    pub fn score(&self) -> i64 {
        self.pluses - self.minuses
    }
}

/// A karma change to apply
#[derive(Debug, Clone)]
pub struct KarmaChange<'a> {
    pub user_uid: u64,
    pub message_id: u64,
    pub item: &'a KarmaItem,
    pub at: DateTime<Utc>,
}

/// SQLite-backed store
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database at `path`
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// In-memory database (for tests and dry runs)
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_uid INTEGER NOT NULL UNIQUE,
                username TEXT NOT NULL,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ignored_channels (
                channel INTEGER PRIMARY KEY,
                added_by INTEGER NOT NULL,
                added_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS channel_settings (
                channel INTEGER PRIMARY KEY,
                mini_karma INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS karma (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                added TEXT NOT NULL,
                pluses INTEGER NOT NULL DEFAULT 0,
                minuses INTEGER NOT NULL DEFAULT 0,
                neutrals INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS karma_changes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                karma_id INTEGER NOT NULL REFERENCES karma(id),
                user_uid INTEGER NOT NULL,
                message_id INTEGER NOT NULL,
                change INTEGER NOT NULL,
                score INTEGER NOT NULL,
                reason TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_changes_user_karma
                ON karma_changes(user_uid, karma_id, created_at);
            "#,
        )?;
        Ok(Self { conn })
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Create the user row, or move its last-seen time forward.
    pub fn record_user_activity(
        &self,
        user_uid: u64,
        username: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<UserActivity> {
        let updated = self.conn.execute(
            "UPDATE users SET last_seen = ?2 WHERE user_uid = ?1",
            params![user_uid as i64, seen_at],
        )?;
        if updated > 0 {
            return Ok(UserActivity::Seen);
        }

        self.conn.execute(
            "INSERT INTO users (user_uid, username, first_seen, last_seen) VALUES (?1, ?2, ?3, ?3)",
            params![user_uid as i64, username, seen_at],
        )?;
        Ok(UserActivity::Created)
    }

    pub fn get_user(&self, user_uid: u64) -> Result<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                "SELECT user_uid, username, first_seen, last_seen FROM users WHERE user_uid = ?1",
                params![user_uid as i64],
                |row| {
                    Ok(UserRecord {
                        user_uid: row.get::<_, i64>(0)? as u64,
                        username: row.get(1)?,
                        first_seen: row.get(2)?,
                        last_seen: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    // ------------------------------------------------------------------------
    // Channel blacklist and settings
    // ------------------------------------------------------------------------

    pub fn is_channel_ignored(&self, channel: u64) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT channel FROM ignored_channels WHERE channel = ?1",
                params![channel as i64],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Returns false if the channel was already ignored
    pub fn ignore_channel(&self, channel: u64, added_by: u64) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO ignored_channels (channel, added_by, added_at) VALUES (?1, ?2, ?3)",
            params![channel as i64, added_by as i64, Utc::now()],
        )?;
        Ok(inserted > 0)
    }

    /// Returns false if the channel was not ignored
    pub fn unignore_channel(&self, channel: u64) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM ignored_channels WHERE channel = ?1",
            params![channel as i64],
        )?;
        Ok(deleted > 0)
    }

    pub fn ignored_channels(&self) -> Result<Vec<IgnoredChannel>> {
        let mut stmt = self
            .conn
            .prepare("SELECT channel, added_by, added_at FROM ignored_channels ORDER BY added_at")?;
        let rows = stmt.query_map([], |row| {
            Ok(IgnoredChannel {
                channel: row.get::<_, i64>(0)? as u64,
                added_by: row.get::<_, i64>(1)? as u64,
                added_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn mini_karma_mode(&self, channel: u64) -> Result<MiniKarmaMode> {
        let mini: Option<bool> = self
            .conn
            .query_row(
                "SELECT mini_karma FROM channel_settings WHERE channel = ?1",
                params![channel as i64],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match mini {
            Some(true) => MiniKarmaMode::Mini,
            _ => MiniKarmaMode::Normal,
        })
    }

    pub fn set_mini_karma_mode(&self, channel: u64, mode: MiniKarmaMode) -> Result<()> {
        self.conn.execute(
            "INSERT INTO channel_settings (channel, mini_karma) VALUES (?1, ?2)
             ON CONFLICT(channel) DO UPDATE SET mini_karma = excluded.mini_karma",
            params![channel as i64, mode == MiniKarmaMode::Mini],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Karma
    // ------------------------------------------------------------------------

    pub fn karma(&self, topic: &str) -> Result<Option<KarmaRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT name, pluses, minuses, neutrals FROM karma WHERE name = ?1",
                params![topic],
                karma_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Highest scoring topics first
    pub fn top_karma(&self, limit: usize) -> Result<Vec<KarmaRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, pluses, minuses, neutrals FROM karma
             ORDER BY (pluses - minuses) DESC, name ASC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], karma_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// When `user_uid` last changed `topic`, if ever
    pub fn last_karma_change(&self, user_uid: u64, topic: &str) -> Result<Option<DateTime<Utc>>> {
        let at = self
            .conn
            .query_row(
                "SELECT MAX(c.created_at) FROM karma_changes c
                 JOIN karma k ON k.id = c.karma_id
                 WHERE c.user_uid = ?1 AND k.name = ?2",
                params![user_uid as i64, topic],
                |row| row.get::<_, Option<DateTime<Utc>>>(0),
            )?;
        Ok(at)
    }

    /// Apply one change atomically and return the updated totals
    pub fn apply_karma(&mut self, change: &KarmaChange<'_>) -> Result<KarmaRecord> {
        let tx = self.conn.transaction()?;
        let topic = &change.item.topic;

        tx.execute(
            "INSERT INTO karma (name, added) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
            params![topic, change.at],
        )?;

        let column = match change.item.op {
            KarmaOp::Plus => "pluses",
            KarmaOp::Minus => "minuses",
            KarmaOp::Neutral => "neutrals",
        };
        tx.execute(
            &format!("UPDATE karma SET {column} = {column} + 1 WHERE name = ?1"),
            params![topic],
        )?;

        let (karma_id, record): (i64, KarmaRecord) = tx.query_row(
            "SELECT id, name, pluses, minuses, neutrals FROM karma WHERE name = ?1",
            params![topic],
            |row| {
                Ok((
                    row.get(0)?,
                    KarmaRecord {
                        name: row.get(1)?,
                        pluses: row.get(2)?,
                        minuses: row.get(3)?,
                        neutrals: row.get(4)?,
                    },
                ))
            },
        )?;

        tx.execute(
            "INSERT INTO karma_changes (karma_id, user_uid, message_id, change, score, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                karma_id,
                change.user_uid as i64,
                change.message_id as i64,
                change.item.op.delta(),
                record.score(),
                change.item.reason,
                change.at
            ],
        )?;

        tx.commit()?;
        Ok(record)
    }
}

fn karma_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<KarmaRecord> {
    Ok(KarmaRecord {
        name: row.get(0)?,
        pluses: row.get(1)?,
        minuses: row.get(2)?,
        neutrals: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::NamedTempFile;

    fn test_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn item(topic: &str, op: KarmaOp) -> KarmaItem {
        KarmaItem {
            topic: topic.to_string(),
            op,
            reason: None,
        }
    }

    #[test]
    fn test_user_created_then_seen() {
        let store = test_store();
        let t0 = Utc::now() - Duration::hours(1);
        let t1 = Utc::now();

        assert_eq!(store.record_user_activity(42, "alice", t0).unwrap(), UserActivity::Created);
        assert_eq!(store.record_user_activity(42, "alice2", t1).unwrap(), UserActivity::Seen);

        let user = store.get_user(42).unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.first_seen, t0);
        assert_eq!(user.last_seen, t1);
    }

    #[test]
    fn test_ignore_and_unignore_channel() {
        let store = test_store();
        assert!(!store.is_channel_ignored(7).unwrap());
        assert!(store.ignore_channel(7, 1).unwrap());
        assert!(!store.ignore_channel(7, 1).unwrap());
        assert!(store.is_channel_ignored(7).unwrap());
        assert_eq!(store.ignored_channels().unwrap().len(), 1);
        assert!(store.unignore_channel(7).unwrap());
        assert!(!store.is_channel_ignored(7).unwrap());
    }

    #[test]
    fn test_mini_karma_mode_defaults_to_normal() {
        let store = test_store();
        assert_eq!(store.mini_karma_mode(5).unwrap(), MiniKarmaMode::Normal);
        store.set_mini_karma_mode(5, MiniKarmaMode::Mini).unwrap();
        assert_eq!(store.mini_karma_mode(5).unwrap(), MiniKarmaMode::Mini);
        store.set_mini_karma_mode(5, MiniKarmaMode::Normal).unwrap();
        assert_eq!(store.mini_karma_mode(5).unwrap(), MiniKarmaMode::Normal);
    }

    #[test]
    fn test_apply_karma_accumulates() {
        let mut store = test_store();
        let plus = item("rust", KarmaOp::Plus);
        let minus = item("rust", KarmaOp::Minus);
        let now = Utc::now();

        for (i, it) in [&plus, &plus, &minus].into_iter().enumerate() {
            store
                .apply_karma(&KarmaChange { user_uid: i as u64, message_id: 1, item: it, at: now })
                .unwrap();
        }

        let record = store.karma("rust").unwrap().unwrap();
        assert_eq!(record.pluses, 2);
        assert_eq!(record.minuses, 1);
        assert_eq!(record.score(), 1);
    }

    #[test]
    fn test_last_change_is_per_user_and_topic() {
        let mut store = test_store();
        let at = Utc::now() - Duration::minutes(2);
        store
            .apply_karma(&KarmaChange {
                user_uid: 9,
                message_id: 1,
                item: &item("tea", KarmaOp::Plus),
                at,
            })
            .unwrap();

        assert_eq!(store.last_karma_change(9, "tea").unwrap(), Some(at));
        assert_eq!(store.last_karma_change(10, "tea").unwrap(), None);
        assert_eq!(store.last_karma_change(9, "coffee").unwrap(), None);
    }

    #[test]
    fn test_top_karma_order() {
        let mut store = test_store();
        let now = Utc::now();
        for (topic, op) in [("a", KarmaOp::Plus), ("b", KarmaOp::Minus), ("c", KarmaOp::Plus), ("c", KarmaOp::Plus)] {
            store
                .apply_karma(&KarmaChange { user_uid: 1, message_id: 1, item: &item(topic, op), at: now })
                .unwrap();
        }
        let names: Vec<_> = store.top_karma(2).unwrap().into_iter().map(|k| k.name).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_file_store_persists() {
        let tmp = NamedTempFile::new().unwrap();
        {
            let store = Store::open_at(tmp.path()).unwrap();
            store.ignore_channel(3, 1).unwrap();
        }
        let store = Store::open_at(tmp.path()).unwrap();
        assert!(store.is_channel_ignored(3).unwrap());
    }
}
