use kushl_core::db::open_db_in_memory;
use kushl_core::{
    PaymentRecord, PaymentRepository, PaymentStatus, RepoError, SqlitePaymentRepository,
    SqliteUserRepository, SqliteWorkRepository, TaskStatus, UserProfile, UserRepository, UserType,
    WorkService,
};
use rusqlite::Connection;
use uuid::Uuid;

struct Fixture {
    student: UserProfile,
    task_id: Uuid,
}

fn seed(conn: &Connection) -> Fixture {
    let users = SqliteUserRepository::new(conn);
    let employer = UserProfile::new(
        UserType::Employer,
        "Crest Media",
        "ops@crest.example",
        "+91-90000-00001",
        "pw",
    );
    let student = UserProfile::new(
        UserType::Student,
        "Asha Verma",
        "asha@example.com",
        "+91-90000-00000",
        "pw",
    );
    users.create_user(&employer).unwrap();
    users.create_user(&student).unwrap();

    let work = WorkService::new(SqliteWorkRepository::new(conn));
    let project = work
        .create_project(employer.uuid, "Diwali Launch", "")
        .unwrap();
    let sprint = work.create_sprint(project.uuid, "Week 1").unwrap();
    let campaign = work.create_campaign(sprint.uuid, "Reels").unwrap();
    let task = work.create_task(campaign.uuid, "Edit teaser", "", None).unwrap();
    work.update_task_status(task.uuid, TaskStatus::Completed)
        .unwrap();

    Fixture {
        student,
        task_id: task.uuid,
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);
    let repo = SqlitePaymentRepository::new(&conn);

    let payment = PaymentRecord::new(fixture.task_id, fixture.student.uuid, 50_000, 7_500);
    let id = repo.create_payment(&payment).unwrap();

    let loaded = repo.get_payment(id).unwrap().unwrap();
    assert_eq!(loaded, payment);
    assert_eq!(loaded.status, PaymentStatus::Pending);
}

#[test]
fn listings_cover_user_and_task_views() {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);
    let repo = SqlitePaymentRepository::new(&conn);

    let first = PaymentRecord::new(fixture.task_id, fixture.student.uuid, 50_000, 7_500);
    let second = PaymentRecord::new(fixture.task_id, fixture.student.uuid, 10_000, 1_500);
    repo.create_payment(&first).unwrap();
    repo.create_payment(&second).unwrap();

    let for_user = repo.list_payments_for_user(fixture.student.uuid).unwrap();
    assert_eq!(for_user.len(), 2);

    let for_task = repo.list_payments_for_task(fixture.task_id).unwrap();
    assert_eq!(for_task.len(), 2);

    let for_stranger = repo.list_payments_for_user(Uuid::new_v4()).unwrap();
    assert!(for_stranger.is_empty());
}

#[test]
fn update_status_moves_one_record() {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);
    let repo = SqlitePaymentRepository::new(&conn);

    let first = PaymentRecord::new(fixture.task_id, fixture.student.uuid, 50_000, 7_500);
    let second = PaymentRecord::new(fixture.task_id, fixture.student.uuid, 10_000, 1_500);
    repo.create_payment(&first).unwrap();
    repo.create_payment(&second).unwrap();

    repo.update_status(first.uuid, PaymentStatus::Released).unwrap();

    let loaded_first = repo.get_payment(first.uuid).unwrap().unwrap();
    let loaded_second = repo.get_payment(second.uuid).unwrap().unwrap();
    assert_eq!(loaded_first.status, PaymentStatus::Released);
    assert_eq!(loaded_second.status, PaymentStatus::Pending);
}

#[test]
fn update_status_on_missing_record_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let repo = SqlitePaymentRepository::new(&conn);

    let err = repo
        .update_status(Uuid::new_v4(), PaymentStatus::Failed)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}
