//! User profile domain model.
//!
//! # Responsibility
//! - Define the account record shared by student/employer/admin flows.
//! - Keep nested profile/payout/compliance sub-objects as one unit.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another account.
//! - E-mail identifies an account; uniqueness is enforced at persistence.
//! - Accounts are never hard-deleted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_epoch_ms;

/// Stable identifier for user accounts.
pub type UserId = Uuid;

/// Marketplace role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Applies to and works on posted tasks.
    Student,
    /// Owns projects and posts tasks.
    Employer,
    /// Moderates users and publishes platform content.
    Admin,
}

/// Public profile details edited on the profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDetails {
    pub headline: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub portfolio_url: Option<String>,
}

/// Payout destination details for task earnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutDetails {
    /// Payout rail, e.g. `upi` or `bank_transfer`.
    pub method: Option<String>,
    /// Handle or account reference understood by the chosen rail.
    pub payout_handle: Option<String>,
}

/// Platform compliance state of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceDetails {
    pub terms_accepted: bool,
    pub verified: bool,
    /// Epoch ms of verification, when `verified` is set.
    pub verified_at: Option<i64>,
}

/// Rolling counters shown on the profile dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileMetrics {
    pub tasks_completed: u32,
    pub applications_submitted: u32,
    pub total_earned_cents: i64,
    pub average_rating: Option<f32>,
}

/// Canonical account record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable global id used for session, payment and moderation links.
    pub uuid: UserId,
    pub full_name: String,
    pub email: String,
    pub whatsapp_number: String,
    pub user_type: UserType,
    /// Plain credential, compared on login.
    pub password: String,
    pub profile: ProfileDetails,
    pub payment: PayoutDetails,
    pub compliance: ComplianceDetails,
    pub metrics: ProfileMetrics,
    /// Epoch ms of the most recent authenticated activity.
    pub last_active_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserProfile {
    /// Creates a new account with a generated stable id and empty sub-objects.
    pub fn new(
        user_type: UserType,
        full_name: impl Into<String>,
        email: impl Into<String>,
        whatsapp_number: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            full_name: full_name.into(),
            email: email.into(),
            whatsapp_number: whatsapp_number.into(),
            user_type,
            password: password.into(),
            profile: ProfileDetails::default(),
            payment: PayoutDetails::default(),
            compliance: ComplianceDetails::default(),
            metrics: ProfileMetrics::default(),
            last_active_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
