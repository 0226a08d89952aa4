//! Moderation list domain model.
//!
//! # Responsibility
//! - Define the banned/discouraged/encouraged list entry shape.
//!
//! # Invariants
//! - `user_id` is unique within one list kind.
//! - Entries may reference accounts that no longer exist locally; list
//!   membership is intentionally not foreign-keyed to `users`.

use serde::{Deserialize, Serialize};

/// Moderation list an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserListKind {
    Banned,
    Discouraged,
    Encouraged,
}

impl UserListKind {
    /// Storage discriminant for this list kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Banned => "banned",
            Self::Discouraged => "discouraged",
            Self::Encouraged => "encouraged",
        }
    }
}

/// One moderation list membership record.
///
/// `user_id` stays a free-form string: CSV imports carry ids minted outside
/// this installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListEntry {
    pub user_id: String,
    pub username: String,
    pub email: String,
    /// Epoch ms when the entry was added.
    pub added_at: i64,
    /// Admin who added the entry.
    pub added_by: String,
    pub reason: String,
}
