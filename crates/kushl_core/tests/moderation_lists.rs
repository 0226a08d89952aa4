use kushl_core::db::open_db_in_memory;
use kushl_core::{
    ModerationService, SqliteUserListRepository, UserListEntry, UserListKind, UserListRepository,
    CSV_HEADER,
};

fn entry(user_id: &str, username: &str, email: &str) -> UserListEntry {
    UserListEntry {
        user_id: user_id.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        added_at: 1_700_000_000_000,
        added_by: "admin-1".to_string(),
        reason: "spam applications".to_string(),
    }
}

#[test]
fn add_is_idempotent_for_duplicate_user_id() {
    let conn = open_db_in_memory().unwrap();
    let service = ModerationService::new(SqliteUserListRepository::new(&conn));

    assert!(service
        .add_user(UserListKind::Banned, entry("u1", "asha", "asha@example.com"))
        .unwrap());
    // Second add with the same id is a reported no-op.
    assert!(!service
        .add_user(UserListKind::Banned, entry("u1", "asha", "asha@example.com"))
        .unwrap());

    let listed = service.list_users(UserListKind::Banned).unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn same_user_may_sit_on_different_lists() {
    let conn = open_db_in_memory().unwrap();
    let service = ModerationService::new(SqliteUserListRepository::new(&conn));

    assert!(service
        .add_user(UserListKind::Banned, entry("u1", "asha", "asha@example.com"))
        .unwrap());
    assert!(service
        .add_user(
            UserListKind::Encouraged,
            entry("u1", "asha", "asha@example.com")
        )
        .unwrap());

    assert!(service.is_listed(UserListKind::Banned, "u1").unwrap());
    assert!(service.is_listed(UserListKind::Encouraged, "u1").unwrap());
    assert!(!service.is_listed(UserListKind::Discouraged, "u1").unwrap());
}

#[test]
fn remove_missing_id_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let service = ModerationService::new(SqliteUserListRepository::new(&conn));

    service
        .add_user(UserListKind::Banned, entry("u1", "asha", "asha@example.com"))
        .unwrap();

    assert!(!service.remove_user(UserListKind::Banned, "u2").unwrap());
    assert_eq!(service.list_users(UserListKind::Banned).unwrap().len(), 1);

    assert!(service.remove_user(UserListKind::Banned, "u1").unwrap());
    assert!(service.list_users(UserListKind::Banned).unwrap().is_empty());
}

#[test]
fn search_matches_substring_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = ModerationService::new(SqliteUserListRepository::new(&conn));

    service
        .add_user(UserListKind::Banned, entry("u1", "asha_v", "asha@example.com"))
        .unwrap();
    service
        .add_user(UserListKind::Banned, entry("u2", "bilal", "bilal@example.com"))
        .unwrap();

    let hits = service.search_users(UserListKind::Banned, "ASHA").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].user_id, "u1");

    let by_email = service
        .search_users(UserListKind::Banned, "example.com")
        .unwrap();
    assert_eq!(by_email.len(), 2);
}

#[test]
fn export_then_import_round_trips_exactly() {
    let conn = open_db_in_memory().unwrap();
    let service = ModerationService::new(SqliteUserListRepository::new(&conn));

    service
        .add_user(UserListKind::Banned, entry("u1", "asha", "asha@example.com"))
        .unwrap();
    service
        .add_user(UserListKind::Banned, entry("u2", "bilal", "bilal@example.com"))
        .unwrap();

    let exported = service.export_csv(UserListKind::Banned).unwrap();
    assert!(exported.starts_with(CSV_HEADER));

    let original = service.list_users(UserListKind::Banned).unwrap();
    let repo = SqliteUserListRepository::new(&conn);
    repo.clear(UserListKind::Banned).unwrap();

    let outcome = service.import_csv(UserListKind::Banned, &exported).unwrap();
    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(service.list_users(UserListKind::Banned).unwrap(), original);
}

#[test]
fn import_two_rows_into_empty_list_adds_two_records() {
    let conn = open_db_in_memory().unwrap();
    let service = ModerationService::new(SqliteUserListRepository::new(&conn));

    let csv = format!(
        "{CSV_HEADER}\n\
         a,user_a,a@example.com,1700000000000,admin-1,spam\n\
         b,user_b,b@example.com,1700000000000,admin-1,spam"
    );

    let outcome = service.import_csv(UserListKind::Banned, &csv).unwrap();
    assert_eq!(outcome.added, 2);

    let listed = service.list_users(UserListKind::Banned).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].user_id, "a");
    assert_eq!(listed[1].user_id, "b");
}

#[test]
fn import_skips_blank_ids_and_existing_members() {
    let conn = open_db_in_memory().unwrap();
    let service = ModerationService::new(SqliteUserListRepository::new(&conn));

    service
        .add_user(UserListKind::Banned, entry("a", "user_a", "a@example.com"))
        .unwrap();

    let csv = format!(
        "{CSV_HEADER}\n\
         a,user_a,a@example.com,1700000000000,admin-1,spam\n\
         ,ghost,ghost@example.com,1700000000000,admin-1,spam\n\
         c,user_c,c@example.com,1700000000000,admin-1,spam\n"
    );

    let outcome = service.import_csv(UserListKind::Banned, &csv).unwrap();
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped, 2);
}

#[test]
fn import_accepts_reordered_header_columns() {
    let conn = open_db_in_memory().unwrap();
    let service = ModerationService::new(SqliteUserListRepository::new(&conn));

    let csv = "reason,userId,username,email,addedAt,addedBy\n\
               spam,a,user_a,a@example.com,1700000000000,admin-1";

    let outcome = service.import_csv(UserListKind::Banned, csv).unwrap();
    assert_eq!(outcome.added, 1);

    let listed = service.list_users(UserListKind::Banned).unwrap();
    assert_eq!(listed[0].reason, "spam");
    assert_eq!(listed[0].added_by, "admin-1");
}
