//! Work hierarchy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for the project/sprint/campaign/task tree.
//! - Keep SQL details and child ordering behavior inside the repository.
//!
//! # Invariants
//! - Child listing is deterministic: `created_at ASC, uuid ASC`.
//! - `update_task_status` touches exactly one row; sibling rows are never
//!   rewritten.
//! - Deleting a node cascades to its descendants via schema foreign keys.

use crate::model::user::UserId;
use crate::model::work::{
    Assignment, TaskPriority, TaskStatus, WorkItem, WorkItemId, WorkItemKind,
};
use crate::repo::{decode_json_column, encode_json_column, parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const WORK_SELECT_SQL: &str = "SELECT
    uuid,
    kind,
    parent_uuid,
    owner_uuid,
    name,
    description,
    status,
    priority,
    assignment,
    applications,
    created_at,
    updated_at
FROM work_items";

/// Repository interface for work hierarchy operations.
pub trait WorkRepository {
    fn create_item(&self, item: &WorkItem) -> RepoResult<WorkItemId>;
    fn get_item(&self, id: WorkItemId) -> RepoResult<Option<WorkItem>>;
    /// Lists direct children of one node in stable order.
    fn list_children(&self, parent_id: WorkItemId) -> RepoResult<Vec<WorkItem>>;
    /// Lists projects, optionally restricted to one owner.
    fn list_roots(&self, owner_id: Option<UserId>) -> RepoResult<Vec<WorkItem>>;
    /// Replaces the full record. `NotFound` when the id is missing.
    fn update_item(&self, item: &WorkItem) -> RepoResult<()>;
    /// Sets the status of exactly one row.
    fn update_task_status(&self, id: WorkItemId, status: TaskStatus) -> RepoResult<()>;
    /// Hard-deletes a node and, via FK cascade, its whole subtree.
    fn delete_item(&self, id: WorkItemId) -> RepoResult<()>;
}

/// SQLite-backed work hierarchy repository.
pub struct SqliteWorkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_items(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_work_row(row)?);
        }
        Ok(items)
    }
}

impl WorkRepository for SqliteWorkRepository<'_> {
    fn create_item(&self, item: &WorkItem) -> RepoResult<WorkItemId> {
        self.conn.execute(
            "INSERT INTO work_items (
                uuid,
                kind,
                parent_uuid,
                owner_uuid,
                name,
                description,
                status,
                priority,
                assignment,
                applications,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                item.uuid.to_string(),
                kind_to_db(item.kind),
                item.parent_uuid.map(|id| id.to_string()),
                item.owner_uuid.to_string(),
                item.name.as_str(),
                item.description.as_str(),
                item.status.map(status_to_db),
                item.priority.map(priority_to_db),
                item.assignment
                    .as_ref()
                    .map(|a| encode_json_column(a, "work_items", "assignment"))
                    .transpose()?,
                encode_json_column(&item.applications, "work_items", "applications")?,
                item.created_at,
                item.updated_at,
            ],
        )?;

        Ok(item.uuid)
    }

    fn get_item(&self, id: WorkItemId) -> RepoResult<Option<WorkItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WORK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_work_row(row)?));
        }
        Ok(None)
    }

    fn list_children(&self, parent_id: WorkItemId) -> RepoResult<Vec<WorkItem>> {
        self.query_items(
            &format!(
                "{WORK_SELECT_SQL} WHERE parent_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
            ),
            params![parent_id.to_string()],
        )
    }

    fn list_roots(&self, owner_id: Option<UserId>) -> RepoResult<Vec<WorkItem>> {
        match owner_id {
            Some(owner) => self.query_items(
                &format!(
                    "{WORK_SELECT_SQL}
                     WHERE parent_uuid IS NULL AND owner_uuid = ?1
                     ORDER BY created_at ASC, uuid ASC;"
                ),
                params![owner.to_string()],
            ),
            None => self.query_items(
                &format!(
                    "{WORK_SELECT_SQL} WHERE parent_uuid IS NULL ORDER BY created_at ASC, uuid ASC;"
                ),
                params![],
            ),
        }
    }

    fn update_item(&self, item: &WorkItem) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE work_items
             SET
                name = ?1,
                description = ?2,
                status = ?3,
                priority = ?4,
                assignment = ?5,
                applications = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7;",
            params![
                item.name.as_str(),
                item.description.as_str(),
                item.status.map(status_to_db),
                item.priority.map(priority_to_db),
                item.assignment
                    .as_ref()
                    .map(|a| encode_json_column(a, "work_items", "assignment"))
                    .transpose()?,
                encode_json_column(&item.applications, "work_items", "applications")?,
                item.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(item.uuid));
        }

        Ok(())
    }

    fn update_task_status(&self, id: WorkItemId, status: TaskStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE work_items
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

    fn delete_item(&self, id: WorkItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM work_items WHERE uuid = ?1;", params![id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_work_row(row: &Row<'_>) -> RepoResult<WorkItem> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid_column(&uuid_text, "work_items", "uuid")?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in work_items.kind"))
    })?;

    let parent_uuid = match row.get::<_, Option<String>>("parent_uuid")? {
        Some(raw) => Some(parse_uuid_column(&raw, "work_items", "parent_uuid")?),
        None => None,
    };

    let owner_text: String = row.get("owner_uuid")?;
    let owner_uuid = parse_uuid_column(&owner_text, "work_items", "owner_uuid")?;

    let status = match row.get::<_, Option<String>>("status")? {
        Some(raw) => Some(parse_status(&raw).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid status `{raw}` in work_items.status"))
        })?),
        None => None,
    };

    let priority = match row.get::<_, Option<String>>("priority")? {
        Some(raw) => Some(parse_priority(&raw).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid priority `{raw}` in work_items.priority"))
        })?),
        None => None,
    };

    let assignment: Option<Assignment> = match row.get::<_, Option<String>>("assignment")? {
        Some(raw) => Some(decode_json_column(&raw, "work_items", "assignment")?),
        None => None,
    };

    let applications_text: String = row.get("applications")?;

    Ok(WorkItem {
        uuid,
        kind,
        parent_uuid,
        owner_uuid,
        name: row.get("name")?,
        description: row.get("description")?,
        status,
        priority,
        assignment,
        applications: decode_json_column(&applications_text, "work_items", "applications")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn kind_to_db(kind: WorkItemKind) -> &'static str {
    match kind {
        WorkItemKind::Project => "project",
        WorkItemKind::Sprint => "sprint",
        WorkItemKind::Campaign => "campaign",
        WorkItemKind::Task => "task",
    }
}

fn parse_kind(value: &str) -> Option<WorkItemKind> {
    match value {
        "project" => Some(WorkItemKind::Project),
        "sprint" => Some(WorkItemKind::Sprint),
        "campaign" => Some(WorkItemKind::Campaign),
        "task" => Some(WorkItemKind::Task),
        _ => None,
    }
}

fn status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Draft => "draft",
        TaskStatus::Posted => "posted",
        TaskStatus::Assigned => "assigned",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Submitted => "submitted",
        TaskStatus::NeedsRevision => "needs_revision",
        TaskStatus::Approved => "approved",
        TaskStatus::Completed => "completed",
        TaskStatus::Paid => "paid",
        TaskStatus::OnHold => "on_hold",
        TaskStatus::Cancelled => "cancelled",
        TaskStatus::Checklist => "checklist",
        TaskStatus::Credentials => "credentials",
        TaskStatus::BrandBrief => "brand_brief",
        TaskStatus::Resource => "resource",
    }
}

fn parse_status(value: &str) -> Option<TaskStatus> {
    match value {
        "draft" => Some(TaskStatus::Draft),
        "posted" => Some(TaskStatus::Posted),
        "assigned" => Some(TaskStatus::Assigned),
        "in_progress" => Some(TaskStatus::InProgress),
        "submitted" => Some(TaskStatus::Submitted),
        "needs_revision" => Some(TaskStatus::NeedsRevision),
        "approved" => Some(TaskStatus::Approved),
        "completed" => Some(TaskStatus::Completed),
        "paid" => Some(TaskStatus::Paid),
        "on_hold" => Some(TaskStatus::OnHold),
        "cancelled" => Some(TaskStatus::Cancelled),
        "checklist" => Some(TaskStatus::Checklist),
        "credentials" => Some(TaskStatus::Credentials),
        "brand_brief" => Some(TaskStatus::BrandBrief),
        "resource" => Some(TaskStatus::Resource),
        _ => None,
    }
}

fn priority_to_db(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "low",
        TaskPriority::Medium => "medium",
        TaskPriority::High => "high",
        TaskPriority::Urgent => "urgent",
    }
}

fn parse_priority(value: &str) -> Option<TaskPriority> {
    match value {
        "low" => Some(TaskPriority::Low),
        "medium" => Some(TaskPriority::Medium),
        "high" => Some(TaskPriority::High),
        "urgent" => Some(TaskPriority::Urgent),
        _ => None,
    }
}
