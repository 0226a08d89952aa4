use kushl_core::db::open_db_in_memory;
use kushl_core::{
    AuthError, AuthService, KvStore, ProfileUpdate, RegisterRequest, SqliteUserRepository,
    UserType, SESSION_KEY,
};

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        full_name: "Asha Verma".to_string(),
        email: email.to_string(),
        whatsapp_number: "+91-90000-00000".to_string(),
        password: "pw".to_string(),
        user_type: UserType::Student,
    }
}

#[test]
fn register_then_login_opens_a_session() {
    let conn = open_db_in_memory().unwrap();
    let mut auth = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));

    let user = auth.register(register_request("asha@example.com")).unwrap();
    assert!(auth.current_user().is_none());

    let logged_in = auth.login("asha@example.com", "pw").unwrap();
    assert_eq!(logged_in.uuid, user.uuid);
    assert_eq!(auth.current_user().unwrap().uuid, user.uuid);

    // Login stamps the account's last activity.
    assert!(logged_in.last_active_at.is_none());
    auth.refresh();
    assert!(auth.current_user().unwrap().last_active_at.is_some());
}

#[test]
fn register_rejects_malformed_and_duplicate_emails() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));

    let err = auth.register(register_request("not-an-email")).unwrap_err();
    assert!(matches!(err, AuthError::InvalidEmail(_)));

    auth.register(register_request("asha@example.com")).unwrap();
    let err = auth
        .register(register_request("Asha@example.com"))
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken(_)));
}

#[test]
fn login_failures_are_not_distinguished() {
    let conn = open_db_in_memory().unwrap();
    let mut auth = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));
    auth.register(register_request("asha@example.com")).unwrap();

    let unknown = auth.login("ghost@example.com", "pw").unwrap_err();
    assert!(matches!(unknown, AuthError::InvalidCredentials));

    let wrong_password = auth.login("asha@example.com", "nope").unwrap_err();
    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(auth.current_user().is_none());
}

#[test]
fn session_survives_service_reconstruction() {
    let conn = open_db_in_memory().unwrap();

    let user_id = {
        let mut auth = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));
        auth.register(register_request("asha@example.com")).unwrap();
        auth.login("asha@example.com", "pw").unwrap().uuid
    };

    // A fresh construction hydrates from the persisted session record.
    let auth = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));
    assert_eq!(auth.current_user().unwrap().uuid, user_id);
}

#[test]
fn corrupt_session_record_degrades_to_logged_out() {
    let conn = open_db_in_memory().unwrap();
    let kv = KvStore::new(&conn);

    conn.execute(
        "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, 0);",
        rusqlite::params![SESSION_KEY, "{broken"],
    )
    .unwrap();

    let auth = AuthService::new(SqliteUserRepository::new(&conn), kv);
    assert!(auth.current_user().is_none());
}

#[test]
fn logout_removes_the_session_record() {
    let conn = open_db_in_memory().unwrap();
    let mut auth = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));
    auth.register(register_request("asha@example.com")).unwrap();
    auth.login("asha@example.com", "pw").unwrap();

    assert!(auth.logout().unwrap());
    assert!(auth.current_user().is_none());
    assert!(!auth.logout().unwrap());

    let rehydrated = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));
    assert!(rehydrated.current_user().is_none());
}

#[test]
fn update_profile_requires_a_session_and_persists_edits() {
    let conn = open_db_in_memory().unwrap();
    let mut auth = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));
    auth.register(register_request("asha@example.com")).unwrap();

    let err = auth.update_profile(ProfileUpdate::default()).unwrap_err();
    assert!(matches!(err, AuthError::NotLoggedIn));

    auth.login("asha@example.com", "pw").unwrap();
    let updated = auth
        .update_profile(ProfileUpdate {
            full_name: Some("Asha V.".to_string()),
            ..ProfileUpdate::default()
        })
        .unwrap();
    assert_eq!(updated.full_name, "Asha V.");

    // The edit is visible to a fresh hydration, not only the cache.
    let rehydrated = AuthService::new(SqliteUserRepository::new(&conn), KvStore::new(&conn));
    assert_eq!(rehydrated.current_user().unwrap().full_name, "Asha V.");
}
