//! Moderation list use-case service and CSV exchange.
//!
//! # Responsibility
//! - Wrap list membership operations with logging.
//! - Export/import lists in the fixed CSV exchange format.
//!
//! # Invariants
//! - CSV format is `userId,username,email,addedAt,addedBy,reason`: a header
//!   row, then comma-joined fields with no quoting or escaping. A field
//!   containing a comma corrupts its row; the format is fixed by the
//!   existing exchange files, so this fragility is kept as-is.
//! - Import skips rows with a blank `userId` and rows whose `userId` is
//!   already listed.

use crate::model::moderation::{UserListEntry, UserListKind};
use crate::repo::list_repo::UserListRepository;
use crate::repo::RepoError;
use log::info;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Header row of the CSV exchange format.
pub const CSV_HEADER: &str = "userId,username,email,addedAt,addedBy,reason";

const CSV_COLUMNS: [&str; 6] = ["userId", "username", "email", "addedAt", "addedBy", "reason"];

pub type ModerationResult<T> = Result<T, ModerationError>;

/// Errors from moderation list use-cases.
#[derive(Debug)]
pub enum ModerationError {
    /// The CSV header row lacks a required column.
    MissingColumn(&'static str),
    /// The CSV input has no header row.
    EmptyInput,
    Repo(RepoError),
}

impl Display for ModerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "csv header misses column `{column}`"),
            Self::EmptyInput => write!(f, "csv input has no header row"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ModerationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ModerationError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Counts reported by [`ModerationService::import_csv`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Rows added to the list.
    pub added: usize,
    /// Rows skipped: blank id, duplicate id, or already listed.
    pub skipped: usize,
}

/// Moderation list service facade.
pub struct ModerationService<R: UserListRepository> {
    repo: R,
}

impl<R: UserListRepository> ModerationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one entry. Returns `false` when the user is already listed.
    pub fn add_user(&self, kind: UserListKind, entry: UserListEntry) -> ModerationResult<bool> {
        let added = self.repo.add_entry(kind, &entry)?;
        info!(
            "event=list_add module=moderation status=ok list={} user_id={} added={added}",
            kind.as_str(),
            entry.user_id
        );
        Ok(added)
    }

    /// Removes one entry. Returns `false` when the user was not listed.
    pub fn remove_user(&self, kind: UserListKind, user_id: &str) -> ModerationResult<bool> {
        let removed = self.repo.remove_entry(kind, user_id)?;
        info!(
            "event=list_remove module=moderation status=ok list={} user_id={user_id} removed={removed}",
            kind.as_str()
        );
        Ok(removed)
    }

    pub fn list_users(&self, kind: UserListKind) -> ModerationResult<Vec<UserListEntry>> {
        Ok(self.repo.list_entries(kind)?)
    }

    /// Case-insensitive substring search over username and e-mail.
    pub fn search_users(
        &self,
        kind: UserListKind,
        term: &str,
    ) -> ModerationResult<Vec<UserListEntry>> {
        Ok(self.repo.search_entries(kind, term)?)
    }

    pub fn is_listed(&self, kind: UserListKind, user_id: &str) -> ModerationResult<bool> {
        Ok(self.repo.is_listed(kind, user_id)?)
    }

    /// Renders one list in the CSV exchange format.
    pub fn export_csv(&self, kind: UserListKind) -> ModerationResult<String> {
        let entries = self.repo.list_entries(kind)?;

        let mut out = String::from(CSV_HEADER);
        for entry in &entries {
            out.push('\n');
            out.push_str(&format!(
                "{},{},{},{},{},{}",
                entry.user_id,
                entry.username,
                entry.email,
                entry.added_at,
                entry.added_by,
                entry.reason
            ));
        }

        info!(
            "event=list_export module=moderation status=ok list={} rows={}",
            kind.as_str(),
            entries.len()
        );
        Ok(out)
    }

    /// Parses CSV text and adds each row to the list.
    ///
    /// Column positions come from a header-name lookup, so reordered
    /// columns are accepted. Unparseable `addedAt` values fall back to 0.
    pub fn import_csv(&self, kind: UserListKind, text: &str) -> ModerationResult<ImportOutcome> {
        let mut lines = text.lines();
        let header = lines.next().ok_or(ModerationError::EmptyInput)?;
        let columns = header_positions(header)?;

        let mut outcome = ImportOutcome::default();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').collect();

            let user_id = field_at(&columns, &fields, "userId");
            if user_id.is_empty() {
                outcome.skipped += 1;
                continue;
            }

            let entry = UserListEntry {
                user_id: user_id.to_string(),
                username: field_at(&columns, &fields, "username").to_string(),
                email: field_at(&columns, &fields, "email").to_string(),
                added_at: field_at(&columns, &fields, "addedAt").parse().unwrap_or(0),
                added_by: field_at(&columns, &fields, "addedBy").to_string(),
                reason: field_at(&columns, &fields, "reason").to_string(),
            };

            if self.repo.add_entry(kind, &entry)? {
                outcome.added += 1;
            } else {
                outcome.skipped += 1;
            }
        }

        info!(
            "event=list_import module=moderation status=ok list={} added={} skipped={}",
            kind.as_str(),
            outcome.added,
            outcome.skipped
        );
        Ok(outcome)
    }
}

/// Looks one named field up in a split row, defaulting to empty.
fn field_at<'row>(
    columns: &HashMap<&'static str, usize>,
    fields: &[&'row str],
    name: &str,
) -> &'row str {
    columns
        .get(name)
        .and_then(|&idx| fields.get(idx))
        .map(|value| value.trim())
        .unwrap_or("")
}

/// Maps required column names to their position in the header row.
fn header_positions(header: &str) -> ModerationResult<HashMap<&'static str, usize>> {
    let names: Vec<&str> = header.split(',').map(str::trim).collect();

    let mut positions = HashMap::new();
    for column in CSV_COLUMNS {
        let index = names
            .iter()
            .position(|name| *name == column)
            .ok_or(ModerationError::MissingColumn(column))?;
        positions.insert(column, index);
    }
    Ok(positions)
}
