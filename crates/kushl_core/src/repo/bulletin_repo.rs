//! SOP and notification repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence for instructional documents and broadcasts.
//!
//! # Invariants
//! - SOP identity is `(category, title)`; an upsert against an existing
//!   pair replaces the body and keeps the original id.
//! - Notifications are append-only and listed newest first.

use crate::model::bulletin::{Audience, Notification, NotificationId, Sop, SopId};
use crate::model::user::UserType;
use crate::repo::{parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Repository interface for SOPs and notifications.
pub trait BulletinRepository {
    /// Inserts or replaces the SOP identified by `(category, title)`.
    /// Returns the id of the stored row, which is the original id when the
    /// pair already existed.
    fn upsert_sop(&self, sop: &Sop) -> RepoResult<SopId>;
    fn get_sop(&self, id: SopId) -> RepoResult<Option<Sop>>;
    /// Lists SOPs, optionally restricted to one category.
    fn list_sops(&self, category: Option<&str>) -> RepoResult<Vec<Sop>>;
    /// Removes one SOP. Returns `false` when absent.
    fn delete_sop(&self, id: SopId) -> RepoResult<bool>;
    fn publish_notification(&self, notification: &Notification) -> RepoResult<NotificationId>;
    /// Lists broadcasts whose audience flags include the given role,
    /// newest first.
    fn list_notifications_for(&self, user_type: UserType) -> RepoResult<Vec<Notification>>;
}

/// SQLite-backed bulletin repository.
pub struct SqliteBulletinRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBulletinRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BulletinRepository for SqliteBulletinRepository<'_> {
    fn upsert_sop(&self, sop: &Sop) -> RepoResult<SopId> {
        self.conn.execute(
            "INSERT INTO sops (uuid, category, title, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (category, title) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at;",
            params![
                sop.uuid.to_string(),
                sop.category.as_str(),
                sop.title.as_str(),
                sop.body.as_str(),
                sop.created_at,
                sop.updated_at,
            ],
        )?;

        // The stored id may predate this call when the pair already existed.
        let stored: String = self.conn.query_row(
            "SELECT uuid FROM sops WHERE category = ?1 AND title = ?2;",
            params![sop.category.as_str(), sop.title.as_str()],
            |row| row.get(0),
        )?;
        parse_uuid_column(&stored, "sops", "uuid")
    }

    fn get_sop(&self, id: SopId) -> RepoResult<Option<Sop>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, category, title, body, created_at, updated_at
             FROM sops WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sop_row(row)?));
        }
        Ok(None)
    }

    fn list_sops(&self, category: Option<&str>) -> RepoResult<Vec<Sop>> {
        let (sql, bind): (&str, Vec<String>) = match category {
            Some(category) => (
                "SELECT uuid, category, title, body, created_at, updated_at
                 FROM sops WHERE category = ?1
                 ORDER BY category ASC, title ASC;",
                vec![category.to_string()],
            ),
            None => (
                "SELECT uuid, category, title, body, created_at, updated_at
                 FROM sops
                 ORDER BY category ASC, title ASC;",
                Vec::new(),
            ),
        };

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(bind))?;
        let mut sops = Vec::new();
        while let Some(row) = rows.next()? {
            sops.push(parse_sop_row(row)?);
        }
        Ok(sops)
    }

    fn delete_sop(&self, id: SopId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sops WHERE uuid = ?1;", params![id.to_string()])?;
        Ok(changed > 0)
    }

    fn publish_notification(&self, notification: &Notification) -> RepoResult<NotificationId> {
        self.conn.execute(
            "INSERT INTO notifications (
                uuid,
                title,
                body,
                to_students,
                to_employers,
                to_admins,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                notification.uuid.to_string(),
                notification.title.as_str(),
                notification.body.as_str(),
                notification.audience.to_students as i64,
                notification.audience.to_employers as i64,
                notification.audience.to_admins as i64,
                notification.created_at,
            ],
        )?;

        Ok(notification.uuid)
    }

    fn list_notifications_for(&self, user_type: UserType) -> RepoResult<Vec<Notification>> {
        let flag_column = match user_type {
            UserType::Student => "to_students",
            UserType::Employer => "to_employers",
            UserType::Admin => "to_admins",
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, title, body, to_students, to_employers, to_admins, created_at
             FROM notifications
             WHERE {flag_column} = 1
             ORDER BY created_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }
        Ok(notifications)
    }
}

fn parse_sop_row(row: &Row<'_>) -> RepoResult<Sop> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Sop {
        uuid: parse_uuid_column(&uuid_text, "sops", "uuid")?,
        category: row.get("category")?,
        title: row.get("title")?,
        body: row.get("body")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Notification {
        uuid: parse_uuid_column(&uuid_text, "notifications", "uuid")?,
        title: row.get("title")?,
        body: row.get("body")?,
        audience: Audience {
            to_students: flag_to_bool(row.get("to_students")?, "to_students")?,
            to_employers: flag_to_bool(row.get("to_employers")?, "to_employers")?,
            to_admins: flag_to_bool(row.get("to_admins")?, "to_admins")?,
        },
        created_at: row.get("created_at")?,
    })
}

fn flag_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in notifications.{column}"
        ))),
    }
}
