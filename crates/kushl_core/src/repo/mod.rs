//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts with atomic row operations.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateEmail`)
//!   in addition to DB transport errors.
//! - Absence of a row is `Ok(None)`, never an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod bulletin_repo;
pub mod list_repo;
pub mod payment_repo;
pub mod user_repo;
pub mod work_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Shared error for entity repository operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(Uuid),
    /// An account with this e-mail already exists.
    DuplicateEmail(String),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateEmail(email) => write!(f, "email already registered: {email}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Decodes a JSON text column into a typed sub-object.
pub(crate) fn decode_json_column<T: serde::de::DeserializeOwned>(
    raw: &str,
    table: &str,
    column: &str,
) -> RepoResult<T> {
    serde_json::from_str(raw).map_err(|err| {
        RepoError::InvalidData(format!("invalid JSON in {table}.{column}: {err}"))
    })
}

/// Encodes a sub-object for storage in a JSON text column.
pub(crate) fn encode_json_column<T: serde::Serialize>(
    value: &T,
    table: &str,
    column: &str,
) -> RepoResult<String> {
    serde_json::to_string(value).map_err(|err| {
        RepoError::InvalidData(format!("cannot encode {table}.{column}: {err}"))
    })
}

/// Parses a stored uuid text value.
pub(crate) fn parse_uuid_column(raw: &str, table: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{raw}` in {table}.{column}")))
}
