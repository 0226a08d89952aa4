//! Key-value store adapter over the `kv_entries` table.
//!
//! # Responsibility
//! - Serialize/deserialize JSON values under well-known string keys.
//! - Own the `kushl_` key namespace and per-user key builders.
//!
//! # Invariants
//! - `get`/`set` are synchronous; values are whole JSON documents.
//! - Malformed stored JSON is logged and degrades to `Ok(None)` so callers
//!   fall back to an empty value. There is no schema validation and no
//!   corruption recovery.

use crate::db::DbError;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Prefix shared by every key this crate writes.
pub const KEY_PREFIX: &str = "kushl_";

/// Key holding the current session record.
pub const SESSION_KEY: &str = "kushl_session";

/// Builds the per-user gamification counter key.
pub fn gamification_key(user_id: impl Display) -> String {
    format!("{KEY_PREFIX}gamification_{user_id}")
}

/// Builds the per-user draft-form cache key.
pub fn draft_key(user_id: impl Display, form: &str) -> String {
    format!("{KEY_PREFIX}draft_{user_id}_{form}")
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for KV adapter operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Value could not be serialized for writing.
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize kv value: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous key-value adapter backed by the migrated connection.
pub struct KvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> KvStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Reads and deserializes the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent or the stored JSON cannot
    /// be parsed; the parse failure is logged, never surfaced.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(
                    "event=kv_get module=store status=error key={key} error_code=malformed_json error={err}"
                );
                Ok(None)
            }
        }
    }

    /// Serializes `value` to JSON and writes it under `key`, replacing any
    /// previous value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(StoreError::Serialize)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, raw],
        )?;
        Ok(())
    }

    /// Deletes the value under `key`. Returns whether a value existed.
    pub fn remove(&self, key: &str) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", params![key])?;
        Ok(changed > 0)
    }

    /// Returns whether any value is stored under `key`.
    pub fn contains(&self, key: &str) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM kv_entries WHERE key = ?1;",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Caches an in-progress form payload for the given user.
    pub fn save_draft<T: Serialize>(
        &self,
        user_id: impl Display,
        form: &str,
        value: &T,
    ) -> StoreResult<()> {
        self.set(&draft_key(user_id, form), value)
    }

    /// Loads a cached form payload, if one survives for the given user.
    pub fn load_draft<T: DeserializeOwned>(
        &self,
        user_id: impl Display,
        form: &str,
    ) -> StoreResult<Option<T>> {
        self.get(&draft_key(user_id, form))
    }

    /// Drops a cached form payload. Returns whether a draft existed.
    pub fn discard_draft(&self, user_id: impl Display, form: &str) -> StoreResult<bool> {
        self.remove(&draft_key(user_id, form))
    }
}

#[cfg(test)]
mod tests {
    use super::{draft_key, gamification_key};

    #[test]
    fn per_user_keys_carry_the_shared_prefix() {
        assert_eq!(gamification_key("u1"), "kushl_gamification_u1");
        assert_eq!(draft_key("u1", "task_form"), "kushl_draft_u1_task_form");
    }
}
