//! `KeyValueStore` over the SQLite `kv` table.
//!
//! # Invariants
//! - Wrapped connections are always at the latest migration version.
//! - `set` is an upsert; `remove` of a missing key is a no-op.

use super::migrations::{current_user_version, latest_version};
use super::{open_db, open_db_in_memory, DbError};
use crate::kv::{KeyValueStore, KvResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed durable store.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> KvResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an existing connection that was opened through `open_db`.
    ///
    /// # Errors
    /// - `DbError::UninitializedConnection` when migrations are not applied.
    pub fn from_connection(conn: Connection) -> KvResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(&conn)?;
        if actual_version != expected_version {
            return Err(DbError::UninitializedConnection {
                expected_version,
                actual_version,
            }
            .into());
        }
        Ok(Self { conn })
    }

    /// Releases the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> KvResult<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1;", [key])?;
        Ok(())
    }
}
