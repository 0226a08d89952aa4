//! Core data layer for the kushl task marketplace.
//! This crate is the single source of truth for marketplace records.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bulletin::{Audience, Notification, Sop};
pub use model::moderation::{UserListEntry, UserListKind};
pub use model::payment::{PaymentRecord, PaymentStatus};
pub use model::user::{UserId, UserProfile, UserType};
pub use model::work::{
    Application, Assignment, TaskPriority, TaskStatus, WorkItem, WorkItemId, WorkItemKind,
};
pub use repo::bulletin_repo::{BulletinRepository, SqliteBulletinRepository};
pub use repo::list_repo::{SqliteUserListRepository, UserListRepository};
pub use repo::payment_repo::{PaymentRepository, SqlitePaymentRepository};
pub use repo::user_repo::{SqliteUserRepository, UserListQuery, UserRepository};
pub use repo::work_repo::{SqliteWorkRepository, WorkRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{AuthError, AuthService, ProfileUpdate, RegisterRequest};
pub use service::gamification_service::{
    GamificationRecord, GamificationService, POINTS_PER_LEVEL,
};
pub use service::moderation_service::{ImportOutcome, ModerationService, CSV_HEADER};
pub use service::work_service::{BoardColumn, ProjectTree, WorkService, WorkServiceError};
pub use store::{KvStore, StoreError, SESSION_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
