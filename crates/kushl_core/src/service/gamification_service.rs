//! Gamification counters use-case service.
//!
//! # Responsibility
//! - Maintain per-user points/level/streak counters in the KV store.
//!
//! # Invariants
//! - Level is derived from points by integer division; it is never stored
//!   out of step with points.
//! - Streak day arithmetic uses the caller-supplied date. Which timezone
//!   defines "a day" is an open product question; this service takes no
//!   position and never reads the wall clock.

use crate::model::user::UserId;
use crate::store::{gamification_key, KvStore, StoreResult};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

/// Points required to advance one level.
pub const POINTS_PER_LEVEL: u32 = 100;

/// Per-user counters persisted under the gamification key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationRecord {
    pub points: u32,
    /// Always `points / POINTS_PER_LEVEL + 1`.
    pub level: u32,
    pub streak_days: u32,
    /// Calendar date of the most recent counted login.
    pub last_login_date: Option<NaiveDate>,
}

impl Default for GamificationRecord {
    fn default() -> Self {
        Self {
            points: 0,
            level: 1,
            streak_days: 0,
            last_login_date: None,
        }
    }
}

/// Gamification counter service over the KV store.
pub struct GamificationService<'conn> {
    kv: KvStore<'conn>,
}

impl<'conn> GamificationService<'conn> {
    pub fn new(kv: KvStore<'conn>) -> Self {
        Self { kv }
    }

    /// Loads the counters for one user, defaulting to a fresh record.
    pub fn record(&self, user_id: UserId) -> StoreResult<GamificationRecord> {
        Ok(self
            .kv
            .get(&gamification_key(user_id))?
            .unwrap_or_default())
    }

    /// Adds points and re-derives the level.
    pub fn award_points(&self, user_id: UserId, points: u32) -> StoreResult<GamificationRecord> {
        let mut record = self.record(user_id)?;
        record.points = record.points.saturating_add(points);
        record.level = record.points / POINTS_PER_LEVEL + 1;
        self.kv.set(&gamification_key(user_id), &record)?;

        info!(
            "event=award_points module=gamification status=ok user_id={user_id} points={} level={}",
            record.points, record.level
        );
        Ok(record)
    }

    /// Counts a login on `today` against the streak.
    ///
    /// Same-day repeats are no-ops, a login on the day after the last one
    /// extends the streak, any other gap resets it to 1.
    pub fn record_login(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> StoreResult<GamificationRecord> {
        let mut record = self.record(user_id)?;

        match record.last_login_date {
            Some(last) if last == today => return Ok(record),
            Some(last) if last.succ_opt() == Some(today) => {
                record.streak_days += 1;
            }
            _ => record.streak_days = 1,
        }
        record.last_login_date = Some(today);
        self.kv.set(&gamification_key(user_id), &record)?;

        info!(
            "event=record_login module=gamification status=ok user_id={user_id} streak_days={}",
            record.streak_days
        );
        Ok(record)
    }
}
