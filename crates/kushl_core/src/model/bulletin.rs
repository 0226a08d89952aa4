//! SOP and notification domain models.
//!
//! # Responsibility
//! - Define the instructional document and broadcast record shapes.
//!
//! # Invariants
//! - An SOP is identified by its `(category, title)` pair; upserts against
//!   the same pair replace the body and keep the original id.
//! - Notification audience flags are independent booleans.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_epoch_ms;
use super::user::UserType;

/// Stable identifier for SOP documents.
pub type SopId = Uuid;

/// Stable identifier for notifications.
pub type NotificationId = Uuid;

/// Category-scoped standard operating procedure document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sop {
    pub uuid: SopId,
    pub category: String,
    pub title: String,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Sop {
    /// Creates a new SOP document with a generated stable id.
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            category: category.into(),
            title: title.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Which marketplace roles a notification targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audience {
    pub to_students: bool,
    pub to_employers: bool,
    pub to_admins: bool,
}

impl Audience {
    /// Audience covering every role.
    pub fn everyone() -> Self {
        Self {
            to_students: true,
            to_employers: true,
            to_admins: true,
        }
    }

    /// Returns whether the given role is targeted.
    pub fn includes(self, user_type: UserType) -> bool {
        match user_type {
            UserType::Student => self.to_students,
            UserType::Employer => self.to_employers,
            UserType::Admin => self.to_admins,
        }
    }
}

/// One broadcast message shown to the targeted roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub uuid: NotificationId,
    pub title: String,
    pub body: String,
    pub audience: Audience,
    pub created_at: i64,
}

impl Notification {
    /// Creates a new notification with a generated stable id.
    pub fn new(title: impl Into<String>, body: impl Into<String>, audience: Audience) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            audience,
            created_at: now_epoch_ms(),
        }
    }
}
