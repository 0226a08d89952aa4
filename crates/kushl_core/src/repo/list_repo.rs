//! Moderation list repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide membership operations over `user_list_entries` rows.
//!
//! # Invariants
//! - `user_id` is unique within one list kind.
//! - Duplicate adds and missing removes are no-ops reported as `false`,
//!   never errors.
//! - Listing order is deterministic: `added_at ASC, user_id ASC`.

use crate::model::moderation::{UserListEntry, UserListKind};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    user_id,
    username,
    email,
    added_at,
    added_by,
    reason
FROM user_list_entries";

/// Repository interface for moderation list membership.
pub trait UserListRepository {
    /// Adds one entry. Returns `false` without writing when the `user_id`
    /// is already present in the list.
    fn add_entry(&self, kind: UserListKind, entry: &UserListEntry) -> RepoResult<bool>;
    /// Removes one entry by `user_id`. Returns `false` when absent.
    fn remove_entry(&self, kind: UserListKind, user_id: &str) -> RepoResult<bool>;
    fn list_entries(&self, kind: UserListKind) -> RepoResult<Vec<UserListEntry>>;
    /// Case-insensitive substring match over username and e-mail.
    fn search_entries(&self, kind: UserListKind, term: &str) -> RepoResult<Vec<UserListEntry>>;
    fn is_listed(&self, kind: UserListKind, user_id: &str) -> RepoResult<bool>;
    /// Empties one list. Returns the number of removed entries.
    fn clear(&self, kind: UserListKind) -> RepoResult<usize>;
}

/// SQLite-backed moderation list repository.
pub struct SqliteUserListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserListRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserListRepository for SqliteUserListRepository<'_> {
    fn add_entry(&self, kind: UserListKind, entry: &UserListEntry) -> RepoResult<bool> {
        // INSERT OR IGNORE keeps the first record; a duplicate user_id in
        // the same list reports changed == 0.
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO user_list_entries (
                list_kind,
                user_id,
                username,
                email,
                added_at,
                added_by,
                reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                kind.as_str(),
                entry.user_id.as_str(),
                entry.username.as_str(),
                entry.email.as_str(),
                entry.added_at,
                entry.added_by.as_str(),
                entry.reason.as_str(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn remove_entry(&self, kind: UserListKind, user_id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM user_list_entries WHERE list_kind = ?1 AND user_id = ?2;",
            params![kind.as_str(), user_id],
        )?;
        Ok(changed > 0)
    }

    fn list_entries(&self, kind: UserListKind) -> RepoResult<Vec<UserListEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} WHERE list_kind = ?1 ORDER BY added_at ASC, user_id ASC;"
        ))?;
        let mut rows = stmt.query(params![kind.as_str()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn search_entries(&self, kind: UserListKind, term: &str) -> RepoResult<Vec<UserListEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE list_kind = ?1
               AND (username LIKE '%' || ?2 || '%' OR email LIKE '%' || ?2 || '%')
             ORDER BY added_at ASC, user_id ASC;"
        ))?;
        let mut rows = stmt.query(params![kind.as_str(), term])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn is_listed(&self, kind: UserListKind, user_id: &str) -> RepoResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM user_list_entries WHERE list_kind = ?1 AND user_id = ?2;",
                params![kind.as_str(), user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn clear(&self, kind: UserListKind) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM user_list_entries WHERE list_kind = ?1;",
            params![kind.as_str()],
        )?;
        Ok(changed)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<UserListEntry> {
    Ok(UserListEntry {
        user_id: row.get("user_id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        added_at: row.get("added_at")?,
        added_by: row.get("added_by")?,
        reason: row.get("reason")?,
    })
}
