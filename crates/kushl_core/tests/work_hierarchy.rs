use kushl_core::db::open_db_in_memory;
use kushl_core::{
    Application, Assignment, SqliteUserRepository, SqliteWorkRepository, TaskPriority, TaskStatus,
    UserProfile, UserRepository, UserType, WorkItem, WorkService, WorkServiceError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed_employer(conn: &Connection) -> UserProfile {
    let repo = SqliteUserRepository::new(conn);
    let employer = UserProfile::new(
        UserType::Employer,
        "Crest Media",
        "ops@crest.example",
        "+91-90000-00001",
        "pw",
    );
    repo.create_user(&employer).unwrap();
    employer
}

fn seed_campaign(conn: &Connection, service: &WorkService<SqliteWorkRepository<'_>>) -> Uuid {
    let employer = seed_employer(conn);
    let project = service
        .create_project(employer.uuid, "Diwali Launch", "seasonal push")
        .unwrap();
    let sprint = service.create_sprint(project.uuid, "Week 1").unwrap();
    let campaign = service.create_campaign(sprint.uuid, "Reels").unwrap();
    campaign.uuid
}

#[test]
fn full_chain_create_and_tree_readback() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let employer = seed_employer(&conn);

    let project = service
        .create_project(employer.uuid, "Diwali Launch", "seasonal push")
        .unwrap();
    let sprint = service.create_sprint(project.uuid, "Week 1").unwrap();
    let campaign = service.create_campaign(sprint.uuid, "Reels").unwrap();
    let task = service
        .create_task(campaign.uuid, "Edit teaser", "30s cut", Some(TaskPriority::High))
        .unwrap();

    assert_eq!(sprint.owner_uuid, employer.uuid);
    assert_eq!(task.status, Some(TaskStatus::Draft));

    let tree = service.project_tree(project.uuid).unwrap();
    assert_eq!(tree.project.uuid, project.uuid);
    assert_eq!(tree.sprints.len(), 1);
    assert_eq!(tree.sprints[0].campaigns.len(), 1);
    assert_eq!(tree.sprints[0].campaigns[0].tasks.len(), 1);
    assert_eq!(tree.sprints[0].campaigns[0].tasks[0].uuid, task.uuid);
}

#[test]
fn parent_kind_chain_is_enforced() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let employer = seed_employer(&conn);

    let project = service
        .create_project(employer.uuid, "Diwali Launch", "")
        .unwrap();

    // A task cannot hang directly off a project.
    let err = service
        .create_task(project.uuid, "Orphan", "", None)
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::ParentMustBe { .. }));

    let err = service.create_sprint(Uuid::new_v4(), "Nowhere").unwrap_err();
    assert!(matches!(err, WorkServiceError::ParentNotFound(_)));

    let err = service.create_campaign(project.uuid, "Skipped level").unwrap_err();
    assert!(matches!(err, WorkServiceError::ParentMustBe { .. }));

    let err = service.create_project(employer.uuid, "   ", "").unwrap_err();
    assert!(matches!(err, WorkServiceError::BlankName));
}

#[test]
fn status_update_touches_only_the_targeted_task() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let campaign_id = seed_campaign(&conn, &service);

    let task_a = service
        .create_task(campaign_id, "Edit teaser", "", None)
        .unwrap();
    let task_b = service
        .create_task(campaign_id, "Write captions", "", None)
        .unwrap();
    let before_b: WorkItem = service.get_item(task_b.uuid).unwrap().unwrap();

    service
        .update_task_status(task_a.uuid, TaskStatus::InProgress)
        .unwrap();

    let after_a = service.get_item(task_a.uuid).unwrap().unwrap();
    let after_b = service.get_item(task_b.uuid).unwrap().unwrap();
    assert_eq!(after_a.status, Some(TaskStatus::InProgress));
    assert_eq!(after_b, before_b);
}

#[test]
fn any_status_may_replace_any_other() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let campaign_id = seed_campaign(&conn, &service);

    let task = service.create_task(campaign_id, "Edit teaser", "", None).unwrap();

    // No transition graph: jump straight from Draft to Paid and back.
    service.update_task_status(task.uuid, TaskStatus::Paid).unwrap();
    service.update_task_status(task.uuid, TaskStatus::Draft).unwrap();

    let loaded = service.get_item(task.uuid).unwrap().unwrap();
    assert_eq!(loaded.status, Some(TaskStatus::Draft));
}

#[test]
fn status_update_rejects_non_task_targets() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let employer = seed_employer(&conn);

    let project = service
        .create_project(employer.uuid, "Diwali Launch", "")
        .unwrap();
    let err = service
        .update_task_status(project.uuid, TaskStatus::Posted)
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::KindMismatch { .. }));
}

#[test]
fn library_items_require_library_statuses() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let campaign_id = seed_campaign(&conn, &service);

    let brief = service
        .create_library_item(campaign_id, "Brand brief", TaskStatus::BrandBrief)
        .unwrap();
    assert!(brief.status.unwrap().is_library());

    let err = service
        .create_library_item(campaign_id, "Not a container", TaskStatus::Posted)
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::NotALibraryStatus(_)));
}

#[test]
fn repeat_application_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let campaign_id = seed_campaign(&conn, &service);

    let task = service.create_task(campaign_id, "Edit teaser", "", None).unwrap();
    let applicant = Uuid::new_v4();
    let application = Application {
        applicant_id: applicant,
        applicant_name: "Asha Verma".to_string(),
        note: "portfolio attached".to_string(),
        applied_at: 1_700_000_000_000,
    };

    assert!(service.apply_to_task(task.uuid, application.clone()).unwrap());
    assert!(!service.apply_to_task(task.uuid, application).unwrap());

    let loaded = service.get_item(task.uuid).unwrap().unwrap();
    assert_eq!(loaded.applications.len(), 1);
}

#[test]
fn assign_task_sets_assignment_and_status() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let campaign_id = seed_campaign(&conn, &service);

    let task = service.create_task(campaign_id, "Edit teaser", "", None).unwrap();
    let assignee = Uuid::new_v4();
    service
        .assign_task(
            task.uuid,
            Assignment {
                assignee_id: assignee,
                assignee_name: "Asha Verma".to_string(),
                assigned_at: 1_700_000_000_000,
            },
        )
        .unwrap();

    let loaded = service.get_item(task.uuid).unwrap().unwrap();
    assert_eq!(loaded.status, Some(TaskStatus::Assigned));
    assert_eq!(loaded.assignment.unwrap().assignee_id, assignee);
}

#[test]
fn board_groups_workflow_tasks_by_status() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let campaign_id = seed_campaign(&conn, &service);

    let task_a = service.create_task(campaign_id, "Edit teaser", "", None).unwrap();
    let task_b = service.create_task(campaign_id, "Write captions", "", None).unwrap();
    service
        .create_library_item(campaign_id, "Login vault", TaskStatus::Credentials)
        .unwrap();
    service
        .update_task_status(task_b.uuid, TaskStatus::InProgress)
        .unwrap();

    let board = service.list_board(campaign_id).unwrap();
    let column = |status: TaskStatus| {
        board
            .iter()
            .find(|column| column.status == status)
            .unwrap()
            .tasks
            .clone()
    };

    assert_eq!(column(TaskStatus::Draft).len(), 1);
    assert_eq!(column(TaskStatus::Draft)[0].uuid, task_a.uuid);
    assert_eq!(column(TaskStatus::InProgress).len(), 1);
    // Library containers stay off the board.
    let on_board: usize = board.iter().map(|column| column.tasks.len()).sum();
    assert_eq!(on_board, 2);
}

#[test]
fn delete_cascades_to_the_whole_subtree() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkService::new(SqliteWorkRepository::new(&conn));
    let employer = seed_employer(&conn);

    let project = service
        .create_project(employer.uuid, "Diwali Launch", "")
        .unwrap();
    let sprint = service.create_sprint(project.uuid, "Week 1").unwrap();
    let campaign = service.create_campaign(sprint.uuid, "Reels").unwrap();
    let task = service.create_task(campaign.uuid, "Edit teaser", "", None).unwrap();

    service.delete_item(project.uuid).unwrap();

    assert!(service.get_item(sprint.uuid).unwrap().is_none());
    assert!(service.get_item(campaign.uuid).unwrap().is_none());
    assert!(service.get_item(task.uuid).unwrap().is_none());
}
