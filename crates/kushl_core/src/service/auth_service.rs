//! Authentication and session use-case service.
//!
//! # Responsibility
//! - Provide register/login/logout/update-profile entry points.
//! - Cache the current account in memory, hydrated once from the session
//!   key and refreshed by explicit re-reads.
//!
//! # Invariants
//! - The session record in the KV store is the source of truth across
//!   constructions; the in-memory cache is a convenience copy.
//! - Registration rejects malformed e-mail shapes and duplicate e-mails.

use crate::model::now_epoch_ms;
use crate::model::user::{
    ComplianceDetails, PayoutDetails, ProfileDetails, UserId, UserProfile, UserType,
};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::store::{KvStore, StoreError, SESSION_KEY};
use log::{info, warn};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: OnceCell<Regex> = OnceCell::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("e-mail pattern must compile")
    })
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Errors from authentication use-cases.
#[derive(Debug)]
pub enum AuthError {
    /// E-mail does not match the accepted shape.
    InvalidEmail(String),
    /// Another account already uses this e-mail.
    EmailTaken(String),
    /// Unknown e-mail or wrong password. Deliberately not distinguished.
    InvalidCredentials,
    /// Operation requires an authenticated session.
    NotLoggedIn,
    Repo(RepoError),
    Store(StoreError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(email) => write!(f, "invalid e-mail address: {email}"),
            Self::EmailTaken(email) => write!(f, "e-mail already registered: {email}"),
            Self::InvalidCredentials => write!(f, "invalid e-mail or password"),
            Self::NotLoggedIn => write!(f, "no authenticated session"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateEmail(email) => Self::EmailTaken(email),
            other => Self::Repo(other),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Session state persisted under [`SESSION_KEY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    /// Epoch ms when the session was opened.
    pub started_at: i64,
}

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub whatsapp_number: String,
    pub password: String,
    pub user_type: UserType,
}

/// Partial profile edit applied by [`AuthService::update_profile`].
///
/// `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub whatsapp_number: Option<String>,
    pub profile: Option<ProfileDetails>,
    pub payment: Option<PayoutDetails>,
    pub compliance: Option<ComplianceDetails>,
}

/// Authentication service with a session-backed in-memory account cache.
pub struct AuthService<'conn, R: UserRepository> {
    repo: R,
    kv: KvStore<'conn>,
    current: Option<UserProfile>,
}

impl<'conn, R: UserRepository> AuthService<'conn, R> {
    /// Creates the service and hydrates the current account from the
    /// persisted session, when one survives.
    ///
    /// Hydration failures are logged and degrade to a logged-out state.
    pub fn new(repo: R, kv: KvStore<'conn>) -> Self {
        let mut service = Self {
            repo,
            kv,
            current: None,
        };
        service.refresh();
        service
    }

    /// Re-reads the session key and account row, replacing the cache.
    pub fn refresh(&mut self) {
        self.current = None;

        let session: Option<SessionRecord> = match self.kv.get(SESSION_KEY) {
            Ok(session) => session,
            Err(err) => {
                warn!("event=session_hydrate module=auth status=error error={err}");
                return;
            }
        };

        let Some(session) = session else {
            return;
        };

        match self.repo.get_user(session.user_id) {
            Ok(Some(user)) => self.current = Some(user),
            Ok(None) => {
                warn!(
                    "event=session_hydrate module=auth status=error user_id={} error_code=account_missing",
                    session.user_id
                );
            }
            Err(err) => {
                warn!("event=session_hydrate module=auth status=error error={err}");
            }
        }
    }

    /// Creates a new account.
    ///
    /// # Errors
    /// - `InvalidEmail` when the e-mail shape is rejected.
    /// - `EmailTaken` when another account uses the e-mail.
    pub fn register(&self, request: RegisterRequest) -> AuthResult<UserProfile> {
        if !email_re().is_match(request.email.trim()) {
            return Err(AuthError::InvalidEmail(request.email));
        }

        let user = UserProfile::new(
            request.user_type,
            request.full_name,
            request.email.trim().to_string(),
            request.whatsapp_number,
            request.password,
        );
        self.repo.create_user(&user)?;

        info!(
            "event=register module=auth status=ok user_id={} user_type={:?}",
            user.uuid, user.user_type
        );
        Ok(user)
    }

    /// Opens a session for the matching account.
    ///
    /// Writes the session record, stamps `last_active_at` and replaces the
    /// in-memory cache.
    pub fn login(&mut self, email: &str, password: &str) -> AuthResult<UserProfile> {
        let Some(user) = self.repo.find_by_email(email)? else {
            info!("event=login module=auth status=error error_code=unknown_email");
            return Err(AuthError::InvalidCredentials);
        };

        if user.password != password {
            info!(
                "event=login module=auth status=error user_id={} error_code=bad_password",
                user.uuid
            );
            return Err(AuthError::InvalidCredentials);
        }

        let now = now_epoch_ms();
        self.kv.set(
            SESSION_KEY,
            &SessionRecord {
                user_id: user.uuid,
                started_at: now,
            },
        )?;
        self.repo.touch_last_active(user.uuid, now)?;

        info!("event=login module=auth status=ok user_id={}", user.uuid);
        self.current = Some(user.clone());
        Ok(user)
    }

    /// Closes the current session. Returns whether a session existed.
    pub fn logout(&mut self) -> AuthResult<bool> {
        let existed = self.kv.remove(SESSION_KEY)?;
        if let Some(user) = self.current.take() {
            info!("event=logout module=auth status=ok user_id={}", user.uuid);
        }
        Ok(existed)
    }

    /// Returns the cached current account, when logged in.
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    /// Applies a partial edit to the current account and persists it.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> AuthResult<UserProfile> {
        let Some(user) = self.current.as_mut() else {
            return Err(AuthError::NotLoggedIn);
        };

        if let Some(full_name) = update.full_name {
            user.full_name = full_name;
        }
        if let Some(whatsapp_number) = update.whatsapp_number {
            user.whatsapp_number = whatsapp_number;
        }
        if let Some(profile) = update.profile {
            user.profile = profile;
        }
        if let Some(payment) = update.payment {
            user.payment = payment;
        }
        if let Some(compliance) = update.compliance {
            user.compliance = compliance;
        }
        user.updated_at = now_epoch_ms();

        self.repo.update_user(user)?;
        info!(
            "event=update_profile module=auth status=ok user_id={}",
            user.uuid
        );
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::email_re;

    #[test]
    fn email_shape_check_accepts_plain_addresses() {
        assert!(email_re().is_match("asha@example.com"));
        assert!(email_re().is_match("a.b+tag@sub.domain.in"));
    }

    #[test]
    fn email_shape_check_rejects_obvious_garbage() {
        assert!(!email_re().is_match("not-an-email"));
        assert!(!email_re().is_match("two@@example.com "));
        assert!(!email_re().is_match("spaces in@example.com"));
    }
}
