//! Domain model for the kushl marketplace data core.
//!
//! # Responsibility
//! - Define the canonical records persisted by the repository layer.
//! - Keep serialization shapes stable for KV payloads and JSON columns.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID-backed id alias.
//! - Timestamps are unix epoch milliseconds.

pub mod bulletin;
pub mod moderation;
pub mod payment;
pub mod user;
pub mod work;

/// Returns the current wall-clock time as epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
