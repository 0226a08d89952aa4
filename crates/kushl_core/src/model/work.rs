//! Work-breakdown hierarchy domain model.
//!
//! # Responsibility
//! - Define the normalized record shared by project/sprint/campaign/task
//!   levels of the hierarchy.
//! - Fix the flat task status vocabulary, including library pseudo-types.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another work item.
//! - `parent_uuid` points at the next level up; projects have no parent.
//! - Status carries no transition graph: any status may replace any other.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_epoch_ms;
use super::user::UserId;

/// Stable identifier for every node of the work hierarchy.
pub type WorkItemId = Uuid;

/// Level of a node inside the work hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Project,
    Sprint,
    Campaign,
    Task,
}

impl WorkItemKind {
    /// Returns the kind a direct parent of this kind must have.
    pub fn required_parent(self) -> Option<WorkItemKind> {
        match self {
            Self::Project => None,
            Self::Sprint => Some(Self::Project),
            Self::Campaign => Some(Self::Sprint),
            Self::Task => Some(Self::Campaign),
        }
    }
}

/// Flat task status vocabulary.
///
/// Workflow states drive the kanban board; library pseudo-types mark
/// container records for reference material that never move through the
/// workflow. Nothing enforces an ordering between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Draft,
    Posted,
    Assigned,
    InProgress,
    Submitted,
    NeedsRevision,
    Approved,
    Completed,
    Paid,
    OnHold,
    Cancelled,
    Checklist,
    Credentials,
    BrandBrief,
    Resource,
}

impl TaskStatus {
    /// Workflow states in board-column order.
    pub const WORKFLOW: [TaskStatus; 11] = [
        Self::Draft,
        Self::Posted,
        Self::Assigned,
        Self::InProgress,
        Self::Submitted,
        Self::NeedsRevision,
        Self::Approved,
        Self::Completed,
        Self::Paid,
        Self::OnHold,
        Self::Cancelled,
    ];

    /// Library pseudo-types used as reference-material containers.
    pub const LIBRARY: [TaskStatus; 4] = [
        Self::Checklist,
        Self::Credentials,
        Self::BrandBrief,
        Self::Resource,
    ];

    /// Returns whether this status is a library pseudo-type.
    pub fn is_library(self) -> bool {
        matches!(
            self,
            Self::Checklist | Self::Credentials | Self::BrandBrief | Self::Resource
        )
    }
}

/// Task urgency used for board sorting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Accepted assignee of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignee_id: UserId,
    pub assignee_name: String,
    /// Epoch ms when the assignment was made.
    pub assigned_at: i64,
}

/// One student application against a posted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub applicant_id: UserId,
    pub applicant_name: String,
    pub note: String,
    /// Epoch ms when the application was submitted.
    pub applied_at: i64,
}

/// Canonical record for one node of the work hierarchy.
///
/// Task-only projection fields stay `None` on project/sprint/campaign rows,
/// so one storage shape covers the whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub uuid: WorkItemId,
    pub kind: WorkItemKind,
    /// Parent node id. `None` only for projects.
    pub parent_uuid: Option<WorkItemId>,
    /// Owning employer, propagated down from the project.
    pub owner_uuid: UserId,
    pub name: String,
    pub description: String,
    /// Meaningful only when `kind == WorkItemKind::Task`.
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignment: Option<Assignment>,
    pub applications: Vec<Application>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WorkItem {
    /// Creates a new node with a generated stable id.
    ///
    /// Task projection fields start empty; callers set status/priority for
    /// task nodes after construction.
    pub fn new(
        kind: WorkItemKind,
        parent_uuid: Option<WorkItemId>,
        owner_uuid: UserId,
        name: impl Into<String>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            kind,
            parent_uuid,
            owner_uuid,
            name: name.into(),
            description: String::new(),
            status: None,
            priority: None,
            assignment: None,
            applications: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether this node is a task-level record.
    pub fn is_task(&self) -> bool {
        self.kind == WorkItemKind::Task
    }
}
