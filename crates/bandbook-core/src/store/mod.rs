//! SQLite-backed record store.
//!
//! Each record is its own row keyed by `(collection, id)` and carries a
//! version number. Writes touch one row, and [`Store::update`] only succeeds
//! if the row still has the version the caller read, so two writers cannot
//! silently overwrite each other.

pub mod migrations;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::availability::core_roster;
use crate::error::{Error, Result};
use crate::model::{AvailabilityEntry, BandMember, DayKey, Gig, Setlist, Song};
use crate::setlist::SongCatalog;

use migrations::MIGRATIONS;

/// A type that can be kept in the store.
pub trait Record: Serialize + DeserializeOwned {
    /// Collection name, also used as the entity name in errors.
    const COLLECTION: &'static str;

    fn key(&self) -> String;
}

impl Record for Song {
    const COLLECTION: &'static str = "song";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Record for BandMember {
    const COLLECTION: &'static str = "member";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Record for AvailabilityEntry {
    const COLLECTION: &'static str = "availability";

    fn key(&self) -> String {
        Self::key_for(self.day, &self.member_id)
    }
}

impl Record for Setlist {
    const COLLECTION: &'static str = "setlist";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Record for Gig {
    const COLLECTION: &'static str = "gig";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// A record together with the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<R> {
    pub record: R,
    pub version: i64,
}

/// A database connection with typed record operations.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a store at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Generic record operations
impl Store {
    /// Insert a new record. Fails with `Conflict` if the key is taken.
    pub fn insert<R: Record>(&self, record: &R) -> Result<()> {
        let key = record.key();
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO records (collection, id, body, version, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            rusqlite::params![
                R::COLLECTION,
                key,
                serde_json::to_string(record)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(Error::Conflict {
                entity: R::COLLECTION,
                id: key,
            });
        }
        Ok(())
    }

    /// Insert or replace a record regardless of its current version.
    pub fn upsert<R: Record>(&self, record: &R) -> Result<()> {
        self.conn.execute(
            "INSERT INTO records (collection, id, body, version, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4)
             ON CONFLICT (collection, id) DO UPDATE SET
                body = excluded.body,
                version = records.version + 1,
                updated_at = excluded.updated_at",
            rusqlite::params![
                R::COLLECTION,
                record.key(),
                serde_json::to_string(record)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get<R: Record>(&self, key: &str) -> Result<Option<R>> {
        Ok(self.get_versioned(key)?.map(|v| v.record))
    }

    pub fn get_versioned<R: Record>(&self, key: &str) -> Result<Option<Versioned<R>>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT body, version FROM records WHERE collection = ?1 AND id = ?2",
                rusqlite::params![R::COLLECTION, key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(body, version)| -> Result<Versioned<R>> {
            Ok(Versioned {
                record: serde_json::from_str(&body)?,
                version,
            })
        })
        .transpose()
    }

    /// Like [`Store::get`], but a missing record is an error.
    pub fn require<R: Record>(&self, key: &str) -> Result<R> {
        self.get(key)?.ok_or_else(|| Error::NotFound {
            entity: R::COLLECTION,
            id: key.to_string(),
        })
    }

    /// All records of a collection, ordered by key.
    pub fn list<R: Record>(&self) -> Result<Vec<R>> {
        self.list_by_prefix("")
    }

    /// Records whose key starts with `prefix`, ordered by key.
    pub fn list_by_prefix<R: Record>(&self, prefix: &str) -> Result<Vec<R>> {
        let mut stmt = self.conn.prepare(
            "SELECT body FROM records
             WHERE collection = ?1 AND substr(id, 1, length(?2)) = ?2
             ORDER BY id",
        )?;
        let bodies = stmt
            .query_map(rusqlite::params![R::COLLECTION, prefix], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(Error::from))
            .collect()
    }

    /// Write a record back, provided nobody else has written it since
    /// `expected_version` was read. Returns the new version.
    pub fn update<R: Record>(&self, record: &R, expected_version: i64) -> Result<i64> {
        let key = record.key();
        let changed = self.conn.execute(
            "UPDATE records SET body = ?3, version = version + 1, updated_at = ?4
             WHERE collection = ?1 AND id = ?2 AND version = ?5",
            rusqlite::params![
                R::COLLECTION,
                key,
                serde_json::to_string(record)?,
                Utc::now().to_rfc3339(),
                expected_version,
            ],
        )?;

        if changed == 1 {
            return Ok(expected_version + 1);
        }
        if self.get_versioned::<R>(&key)?.is_none() {
            Err(Error::NotFound {
                entity: R::COLLECTION,
                id: key,
            })
        } else {
            log::warn!("Rejected stale write to {} {}", R::COLLECTION, key);
            Err(Error::Conflict {
                entity: R::COLLECTION,
                id: key,
            })
        }
    }

    /// Read a record, apply `change`, and write it back with a version check.
    pub fn modify<R, F>(&self, key: &str, change: F) -> Result<R>
    where
        R: Record,
        F: FnOnce(&mut R) -> Result<()>,
    {
        let Versioned {
            mut record,
            version,
        } = self.get_versioned::<R>(key)?.ok_or_else(|| Error::NotFound {
            entity: R::COLLECTION,
            id: key.to_string(),
        })?;

        change(&mut record)?;
        if record.key() != key {
            return Err(Error::InvalidData(format!(
                "{} {key} may not change its id",
                R::COLLECTION
            )));
        }
        self.update(&record, version)?;
        Ok(record)
    }

    /// Delete a record. Returns whether anything was removed.
    pub fn delete<R: Record>(&self, key: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            rusqlite::params![R::COLLECTION, key],
        )?;
        Ok(changed > 0)
    }

    pub fn count<R: Record>(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            [R::COLLECTION],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

// Domain views
impl Store {
    pub fn songs(&self) -> Result<Vec<Song>> {
        self.list()
    }

    /// Current catalog snapshot for hydration.
    pub fn catalog(&self) -> Result<SongCatalog> {
        Ok(SongCatalog::from_songs(self.songs()?))
    }

    pub fn members(&self) -> Result<Vec<BandMember>> {
        self.list()
    }

    pub fn core_members(&self) -> Result<Vec<BandMember>> {
        Ok(core_roster(&self.members()?))
    }

    /// Record a member's answer for a day, replacing any earlier answer.
    pub fn set_availability(&self, entry: &AvailabilityEntry) -> Result<()> {
        self.upsert(entry)
    }

    pub fn entries_for_day(&self, day: DayKey) -> Result<Vec<AvailabilityEntry>> {
        self.list_by_prefix(&AvailabilityEntry::day_prefix(day))
    }
}
