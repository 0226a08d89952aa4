//! Work hierarchy use-case service.
//!
//! # Responsibility
//! - Validate hierarchy invariants above the repository layer.
//! - Provide project/sprint/campaign/task creation, task workflow and
//!   board/tree read models.
//!
//! # Invariants
//! - A node's parent must exist and sit one level up the
//!   project→sprint→campaign→task chain.
//! - Names must not be blank after trim.
//! - Task status is a flat vocabulary: any status may replace any other.

use crate::model::work::{
    Application, Assignment, TaskPriority, TaskStatus, WorkItem, WorkItemId, WorkItemKind,
};
use crate::model::user::UserId;
use crate::repo::work_repo::WorkRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type WorkResult<T> = Result<T, WorkServiceError>;

/// Errors from work hierarchy use-cases.
#[derive(Debug)]
pub enum WorkServiceError {
    /// Name is blank after trim.
    BlankName,
    /// Target node does not exist.
    NotFound(WorkItemId),
    /// Parent node does not exist.
    ParentNotFound(WorkItemId),
    /// Parent exists but sits at the wrong hierarchy level.
    ParentMustBe {
        parent: WorkItemId,
        expected: WorkItemKind,
        actual: WorkItemKind,
    },
    /// Target node exists but has the wrong kind for this operation.
    KindMismatch {
        id: WorkItemId,
        expected: WorkItemKind,
        actual: WorkItemKind,
    },
    /// Library items must carry a library pseudo-type status.
    NotALibraryStatus(TaskStatus),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for WorkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::NotFound(id) => write!(f, "work item not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent work item not found: {id}"),
            Self::ParentMustBe {
                parent,
                expected,
                actual,
            } => write!(
                f,
                "parent {parent} must be a {expected:?}, found {actual:?}"
            ),
            Self::KindMismatch {
                id,
                expected,
                actual,
            } => write!(f, "work item {id} must be a {expected:?}, found {actual:?}"),
            Self::NotALibraryStatus(status) => {
                write!(f, "status {status:?} is not a library pseudo-type")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// One kanban column of a campaign board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub tasks: Vec<WorkItem>,
}

/// Nested read model of one full project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTree {
    pub project: WorkItem,
    pub sprints: Vec<SprintNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintNode {
    pub sprint: WorkItem,
    pub campaigns: Vec<CampaignNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignNode {
    pub campaign: WorkItem,
    pub tasks: Vec<WorkItem>,
}

/// Work hierarchy service facade.
pub struct WorkService<R: WorkRepository> {
    repo: R,
}

impl<R: WorkRepository> WorkService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a root-level project owned by `owner`.
    pub fn create_project(
        &self,
        owner: UserId,
        name: &str,
        description: &str,
    ) -> WorkResult<WorkItem> {
        let name = non_blank(name)?;
        let mut project = WorkItem::new(WorkItemKind::Project, None, owner, name);
        project.description = description.to_string();
        self.repo.create_item(&project)?;
        info!(
            "event=create_item module=work status=ok kind=project id={}",
            project.uuid
        );
        Ok(project)
    }

    /// Creates a sprint under one project.
    pub fn create_sprint(&self, project_id: WorkItemId, name: &str) -> WorkResult<WorkItem> {
        self.create_child(WorkItemKind::Sprint, project_id, name)
    }

    /// Creates a campaign under one sprint.
    pub fn create_campaign(&self, sprint_id: WorkItemId, name: &str) -> WorkResult<WorkItem> {
        self.create_child(WorkItemKind::Campaign, sprint_id, name)
    }

    /// Creates a workflow task under one campaign with status `Draft`.
    pub fn create_task(
        &self,
        campaign_id: WorkItemId,
        name: &str,
        description: &str,
        priority: Option<TaskPriority>,
    ) -> WorkResult<WorkItem> {
        let mut task = self.create_child(WorkItemKind::Task, campaign_id, name)?;
        task.description = description.to_string();
        task.status = Some(TaskStatus::Draft);
        task.priority = priority;
        self.repo.update_item(&task)?;
        Ok(task)
    }

    /// Creates a library container record under one campaign.
    ///
    /// # Errors
    /// - `NotALibraryStatus` unless `status` is a library pseudo-type.
    pub fn create_library_item(
        &self,
        campaign_id: WorkItemId,
        name: &str,
        status: TaskStatus,
    ) -> WorkResult<WorkItem> {
        if !status.is_library() {
            return Err(WorkServiceError::NotALibraryStatus(status));
        }

        let mut item = self.create_child(WorkItemKind::Task, campaign_id, name)?;
        item.status = Some(status);
        self.repo.update_item(&item)?;
        Ok(item)
    }

    fn create_child(
        &self,
        kind: WorkItemKind,
        parent_id: WorkItemId,
        name: &str,
    ) -> WorkResult<WorkItem> {
        let name = non_blank(name)?;

        let parent = self
            .repo
            .get_item(parent_id)?
            .ok_or(WorkServiceError::ParentNotFound(parent_id))?;

        // required_parent is Some for every non-project kind.
        let expected = kind
            .required_parent()
            .unwrap_or(WorkItemKind::Project);
        if parent.kind != expected {
            return Err(WorkServiceError::ParentMustBe {
                parent: parent_id,
                expected,
                actual: parent.kind,
            });
        }

        let item = WorkItem::new(kind, Some(parent_id), parent.owner_uuid, name);
        self.repo.create_item(&item)?;
        info!(
            "event=create_item module=work status=ok kind={kind:?} id={} parent={parent_id}",
            item.uuid
        );
        Ok(item)
    }

    /// Loads one work item by id.
    pub fn get_item(&self, id: WorkItemId) -> WorkResult<Option<WorkItem>> {
        Ok(self.repo.get_item(id)?)
    }

    /// Lists projects, optionally restricted to one owner.
    pub fn list_projects(&self, owner: Option<UserId>) -> WorkResult<Vec<WorkItem>> {
        Ok(self.repo.list_roots(owner)?)
    }

    /// Sets the status of one task. Any status may replace any other.
    ///
    /// # Errors
    /// - `KindMismatch` when the target is not a task-level record.
    pub fn update_task_status(&self, task_id: WorkItemId, status: TaskStatus) -> WorkResult<()> {
        let task = self.require_task(task_id)?;
        self.repo.update_task_status(task.uuid, status)?;
        info!(
            "event=update_task_status module=work status=ok id={task_id} task_status={status:?}"
        );
        Ok(())
    }

    /// Appends one application to a task.
    ///
    /// A repeat application by the same applicant is a no-op reported as
    /// `false`.
    pub fn apply_to_task(
        &self,
        task_id: WorkItemId,
        application: Application,
    ) -> WorkResult<bool> {
        let mut task = self.require_task(task_id)?;

        if task
            .applications
            .iter()
            .any(|existing| existing.applicant_id == application.applicant_id)
        {
            return Ok(false);
        }

        task.applications.push(application);
        self.repo.update_item(&task)?;
        info!(
            "event=apply_to_task module=work status=ok id={task_id} applications={}",
            task.applications.len()
        );
        Ok(true)
    }

    /// Assigns a task and moves it to `Assigned`.
    pub fn assign_task(&self, task_id: WorkItemId, assignment: Assignment) -> WorkResult<WorkItem> {
        let mut task = self.require_task(task_id)?;
        info!(
            "event=assign_task module=work status=ok id={task_id} assignee={}",
            assignment.assignee_id
        );
        task.assignment = Some(assignment);
        task.status = Some(TaskStatus::Assigned);
        self.repo.update_item(&task)?;
        Ok(task)
    }

    /// Deletes a node and its whole subtree.
    pub fn delete_item(&self, id: WorkItemId) -> WorkResult<()> {
        self.repo.delete_item(id)?;
        info!("event=delete_item module=work status=ok id={id}");
        Ok(())
    }

    /// Groups one campaign's workflow tasks into board columns.
    ///
    /// Library container records are excluded; they never move through the
    /// workflow.
    pub fn list_board(&self, campaign_id: WorkItemId) -> WorkResult<Vec<BoardColumn>> {
        self.require_kind(campaign_id, WorkItemKind::Campaign)?;
        let children = self.repo.list_children(campaign_id)?;

        let columns = TaskStatus::WORKFLOW
            .iter()
            .map(|&status| BoardColumn {
                status,
                tasks: children
                    .iter()
                    .filter(|task| task.status == Some(status))
                    .cloned()
                    .collect(),
            })
            .collect();
        Ok(columns)
    }

    /// Loads one project with its full nested sprint/campaign/task tree.
    pub fn project_tree(&self, project_id: WorkItemId) -> WorkResult<ProjectTree> {
        let project = self.require_kind(project_id, WorkItemKind::Project)?;

        let mut sprints = Vec::new();
        for sprint in self.repo.list_children(project.uuid)? {
            let mut campaigns = Vec::new();
            for campaign in self.repo.list_children(sprint.uuid)? {
                let tasks = self.repo.list_children(campaign.uuid)?;
                campaigns.push(CampaignNode { campaign, tasks });
            }
            sprints.push(SprintNode { sprint, campaigns });
        }

        Ok(ProjectTree { project, sprints })
    }

    fn require_task(&self, id: WorkItemId) -> WorkResult<WorkItem> {
        self.require_kind(id, WorkItemKind::Task)
    }

    fn require_kind(&self, id: WorkItemId, expected: WorkItemKind) -> WorkResult<WorkItem> {
        let item = self
            .repo
            .get_item(id)?
            .ok_or(WorkServiceError::NotFound(id))?;
        if item.kind != expected {
            return Err(WorkServiceError::KindMismatch {
                id,
                expected,
                actual: item.kind,
            });
        }
        Ok(item)
    }
}

fn non_blank(name: &str) -> WorkResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(WorkServiceError::BlankName);
    }
    Ok(trimmed)
}
