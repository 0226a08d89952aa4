//! User account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide atomic CRUD over `users` rows.
//! - Keep e-mail uniqueness and sub-object JSON handling inside the
//!   persistence boundary.
//!
//! # Invariants
//! - E-mail lookup is case-insensitive.
//! - Accounts are never hard-deleted.

use crate::model::user::{UserId, UserProfile, UserType};
use crate::repo::{decode_json_column, encode_json_column, parse_uuid_column, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    full_name,
    email,
    whatsapp_number,
    user_type,
    password,
    profile,
    payment,
    compliance,
    metrics,
    last_active_at,
    created_at,
    updated_at
FROM users";

/// Query options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Optional role filter.
    pub user_type: Option<UserType>,
    /// Case-insensitive substring matched against name and e-mail.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for account CRUD operations.
pub trait UserRepository {
    /// Persists a new account. Rejects an already-registered e-mail.
    fn create_user(&self, user: &UserProfile) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<UserProfile>>;
    /// Case-insensitive e-mail lookup.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<UserProfile>>;
    /// Replaces the full account record. `NotFound` when the id is missing.
    fn update_user(&self, user: &UserProfile) -> RepoResult<()>;
    /// Stamps the most recent authenticated activity.
    fn touch_last_active(&self, id: UserId, at_epoch_ms: i64) -> RepoResult<()>;
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<UserProfile>>;
}

/// SQLite-backed account repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &UserProfile) -> RepoResult<UserId> {
        if self.find_by_email(&user.email)?.is_some() {
            return Err(RepoError::DuplicateEmail(user.email.clone()));
        }

        self.conn.execute(
            "INSERT INTO users (
                uuid,
                full_name,
                email,
                whatsapp_number,
                user_type,
                password,
                profile,
                payment,
                compliance,
                metrics,
                last_active_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                user.uuid.to_string(),
                user.full_name.as_str(),
                user.email.as_str(),
                user.whatsapp_number.as_str(),
                user_type_to_db(user.user_type),
                user.password.as_str(),
                encode_json_column(&user.profile, "users", "profile")?,
                encode_json_column(&user.payment, "users", "payment")?,
                encode_json_column(&user.compliance, "users", "compliance")?,
                encode_json_column(&user.metrics, "users", "metrics")?,
                user.last_active_at,
                user.created_at,
                user.updated_at,
            ],
        )?;

        Ok(user.uuid)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<UserProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<UserProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"))?;
        let mut rows = stmt.query(params![email])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn update_user(&self, user: &UserProfile) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                full_name = ?1,
                email = ?2,
                whatsapp_number = ?3,
                user_type = ?4,
                password = ?5,
                profile = ?6,
                payment = ?7,
                compliance = ?8,
                metrics = ?9,
                last_active_at = ?10,
                updated_at = ?11
             WHERE uuid = ?12;",
            params![
                user.full_name.as_str(),
                user.email.as_str(),
                user.whatsapp_number.as_str(),
                user_type_to_db(user.user_type),
                user.password.as_str(),
                encode_json_column(&user.profile, "users", "profile")?,
                encode_json_column(&user.payment, "users", "payment")?,
                encode_json_column(&user.compliance, "users", "compliance")?,
                encode_json_column(&user.metrics, "users", "metrics")?,
                user.last_active_at,
                user.updated_at,
                user.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(user.uuid));
        }

        Ok(())
    }

    fn touch_last_active(&self, id: UserId, at_epoch_ms: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                last_active_at = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![at_epoch_ms, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<UserProfile>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_type) = query.user_type {
            sql.push_str(" AND user_type = ?");
            bind_values.push(Value::Text(user_type_to_db(user_type).to_string()));
        }

        if let Some(search) = query.search.as_deref() {
            // Naive substring match over name and e-mail, like the profile
            // directory filter. LIKE is case-insensitive for ASCII here.
            sql.push_str(" AND (full_name LIKE '%' || ? || '%' OR email LIKE '%' || ? || '%')");
            bind_values.push(Value::Text(search.to_string()));
            bind_values.push(Value::Text(search.to_string()));
        }

        sql.push_str(" ORDER BY created_at ASC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserProfile> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid_column(&uuid_text, "users", "uuid")?;

    let type_text: String = row.get("user_type")?;
    let user_type = parse_user_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid user type `{type_text}` in users.user_type"))
    })?;

    let profile_text: String = row.get("profile")?;
    let payment_text: String = row.get("payment")?;
    let compliance_text: String = row.get("compliance")?;
    let metrics_text: String = row.get("metrics")?;

    Ok(UserProfile {
        uuid,
        full_name: row.get("full_name")?,
        email: row.get("email")?,
        whatsapp_number: row.get("whatsapp_number")?,
        user_type,
        password: row.get("password")?,
        profile: decode_json_column(&profile_text, "users", "profile")?,
        payment: decode_json_column(&payment_text, "users", "payment")?,
        compliance: decode_json_column(&compliance_text, "users", "compliance")?,
        metrics: decode_json_column(&metrics_text, "users", "metrics")?,
        last_active_at: row.get("last_active_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn user_type_to_db(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Student => "student",
        UserType::Employer => "employer",
        UserType::Admin => "admin",
    }
}

fn parse_user_type(value: &str) -> Option<UserType> {
    match value {
        "student" => Some(UserType::Student),
        "employer" => Some(UserType::Employer),
        "admin" => Some(UserType::Admin),
        _ => None,
    }
}
