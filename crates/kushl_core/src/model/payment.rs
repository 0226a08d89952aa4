//! Payment record domain model.
//!
//! # Responsibility
//! - Define the per-task payout record written when work is settled.
//!
//! # Invariants
//! - Each record is independent; there is no ledger relating records.
//! - Amounts are integer cents.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_epoch_ms;
use super::user::UserId;
use super::work::WorkItemId;

/// Stable identifier for payment records.
pub type PaymentId = Uuid;

/// Settlement state of one payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Released,
    Refunded,
    Failed,
}

/// One payout for one task to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub uuid: PaymentId,
    pub task_uuid: WorkItemId,
    pub user_uuid: UserId,
    /// Gross amount in cents, before commission.
    pub amount_cents: i64,
    /// Platform cut in cents, already included in `amount_cents`.
    pub platform_commission_cents: i64,
    pub status: PaymentStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PaymentRecord {
    /// Creates a pending payment with a generated stable id.
    pub fn new(
        task_uuid: WorkItemId,
        user_uuid: UserId,
        amount_cents: i64,
        platform_commission_cents: i64,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            task_uuid,
            user_uuid,
            amount_cents,
            platform_commission_cents,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
