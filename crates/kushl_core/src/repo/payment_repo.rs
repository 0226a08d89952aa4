//! Payment record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide atomic CRUD over independent `payments` rows.
//!
//! # Invariants
//! - Listing order is deterministic: `created_at ASC, uuid ASC`.
//! - Records are never deleted; settlement changes go through
//!   `update_status`.

use crate::model::payment::{PaymentId, PaymentRecord, PaymentStatus};
use crate::model::user::UserId;
use crate::model::work::WorkItemId;
use crate::repo::{parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const PAYMENT_SELECT_SQL: &str = "SELECT
    uuid,
    task_uuid,
    user_uuid,
    amount_cents,
    platform_commission_cents,
    status,
    created_at,
    updated_at
FROM payments";

/// Repository interface for payment records.
pub trait PaymentRepository {
    fn create_payment(&self, payment: &PaymentRecord) -> RepoResult<PaymentId>;
    fn get_payment(&self, id: PaymentId) -> RepoResult<Option<PaymentRecord>>;
    fn list_payments_for_user(&self, user_id: UserId) -> RepoResult<Vec<PaymentRecord>>;
    fn list_payments_for_task(&self, task_id: WorkItemId) -> RepoResult<Vec<PaymentRecord>>;
    fn update_status(&self, id: PaymentId, status: PaymentStatus) -> RepoResult<()>;
}

/// SQLite-backed payment repository.
pub struct SqlitePaymentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePaymentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_payments(
        &self,
        sql: &str,
        bind: impl rusqlite::Params,
    ) -> RepoResult<Vec<PaymentRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut payments = Vec::new();
        while let Some(row) = rows.next()? {
            payments.push(parse_payment_row(row)?);
        }
        Ok(payments)
    }
}

impl PaymentRepository for SqlitePaymentRepository<'_> {
    fn create_payment(&self, payment: &PaymentRecord) -> RepoResult<PaymentId> {
        self.conn.execute(
            "INSERT INTO payments (
                uuid,
                task_uuid,
                user_uuid,
                amount_cents,
                platform_commission_cents,
                status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                payment.uuid.to_string(),
                payment.task_uuid.to_string(),
                payment.user_uuid.to_string(),
                payment.amount_cents,
                payment.platform_commission_cents,
                status_to_db(payment.status),
                payment.created_at,
                payment.updated_at,
            ],
        )?;

        Ok(payment.uuid)
    }

    fn get_payment(&self, id: PaymentId) -> RepoResult<Option<PaymentRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAYMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_payment_row(row)?));
        }
        Ok(None)
    }

    fn list_payments_for_user(&self, user_id: UserId) -> RepoResult<Vec<PaymentRecord>> {
        self.query_payments(
            &format!(
                "{PAYMENT_SELECT_SQL} WHERE user_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
            ),
            params![user_id.to_string()],
        )
    }

    fn list_payments_for_task(&self, task_id: WorkItemId) -> RepoResult<Vec<PaymentRecord>> {
        self.query_payments(
            &format!(
                "{PAYMENT_SELECT_SQL} WHERE task_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
            ),
            params![task_id.to_string()],
        )
    }

    fn update_status(&self, id: PaymentId, status: PaymentStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE payments
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![status_to_db(status), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_payment_row(row: &Row<'_>) -> RepoResult<PaymentRecord> {
    let uuid_text: String = row.get("uuid")?;
    let task_text: String = row.get("task_uuid")?;
    let user_text: String = row.get("user_uuid")?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in payments.status"))
    })?;

    Ok(PaymentRecord {
        uuid: parse_uuid_column(&uuid_text, "payments", "uuid")?,
        task_uuid: parse_uuid_column(&task_text, "payments", "task_uuid")?,
        user_uuid: parse_uuid_column(&user_text, "payments", "user_uuid")?,
        amount_cents: row.get("amount_cents")?,
        platform_commission_cents: row.get("platform_commission_cents")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn status_to_db(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Released => "released",
        PaymentStatus::Refunded => "refunded",
        PaymentStatus::Failed => "failed",
    }
}

fn parse_status(value: &str) -> Option<PaymentStatus> {
    match value {
        "pending" => Some(PaymentStatus::Pending),
        "released" => Some(PaymentStatus::Released),
        "refunded" => Some(PaymentStatus::Refunded),
        "failed" => Some(PaymentStatus::Failed),
        _ => None,
    }
}
