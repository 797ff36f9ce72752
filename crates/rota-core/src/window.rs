//! Admission window policy: when a week's slots may be reserved.
//!
//! Each week's window opens on the Thursday of the preceding week at
//! 02:59 UTC (immediately after that week's cutoff evening) and closes on
//! its own Wednesday at 21:00 UTC. A week is open iff
//! `opens_at <= now < closes_at`.
//!
//! The cadence is rolling and non-overlapping: for consecutive weeks W and
//! W+1, `closes_at(W) <= opens_at(W+1)` always holds (Wednesday 21:00 is
//! before Thursday 02:59). Between a cutoff and the next release nothing is
//! bookable.
//!
//! Everything here is pure. Callers pass `now` explicitly, which lets the
//! transaction path re-evaluate with a fresher clock reading than the one
//! the status query used.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::calendar::{next_week_start, week_end, week_start};

/// Days from a week's Monday forward to its cutoff day (Wednesday).
const CUTOFF_DAY_OFFSET: u64 = 2;

/// Cutoff time of day, UTC.
const CUTOFF_HOUR: u32 = 21;
const CUTOFF_MINUTE: u32 = 0;

/// Days from a week's Monday back to its release day (the preceding Thursday).
const RELEASE_DAY_OFFSET: u64 = 4;

/// Release time of day, UTC.
const RELEASE_HOUR: u32 = 2;
const RELEASE_MINUTE: u32 = 59;

/// The admission window of one calendar week.
///
/// Derived data, never stored: recomputed from the week's Monday and the
/// fixed policy constants on every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdmissionWindow {
    /// Monday of the week this window admits bookings for.
    pub week_start: NaiveDate,
    /// Friday of the same week.
    pub week_end: NaiveDate,
    /// UTC instant the window opens (inclusive).
    pub opens_at: DateTime<Utc>,
    /// UTC instant the window closes (exclusive).
    pub closes_at: DateTime<Utc>,
}

impl AdmissionWindow {
    /// Computes the admission window for the week containing `date`.
    ///
    /// The input is normalized with [`week_start`], so any weekday selects
    /// a well-defined week (Sunday normalizes forward).
    #[must_use]
    pub fn for_week(date: NaiveDate) -> Self {
        let monday = week_start(date);
        let cutoff_day = monday
            .checked_add_days(Days::new(CUTOFF_DAY_OFFSET))
            .unwrap_or(monday);
        let release_day = monday
            .checked_sub_days(Days::new(RELEASE_DAY_OFFSET))
            .unwrap_or(monday);

        Self {
            week_start: monday,
            week_end: week_end(monday),
            opens_at: at_utc(release_day, RELEASE_HOUR, RELEASE_MINUTE),
            closes_at: at_utc(cutoff_day, CUTOFF_HOUR, CUTOFF_MINUTE),
        }
    }

    /// Returns true if the window is open at `now`.
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.opens_at <= now && now < self.closes_at
    }
}

/// One week's window together with its openness at a specific instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeekStatus {
    /// The week's admission window.
    #[serde(flatten)]
    pub window: AdmissionWindow,
    /// Whether the window was open at the instant the status was taken.
    pub is_open: bool,
}

impl WeekStatus {
    /// Evaluates the window for the week containing `date` at `now`.
    #[must_use]
    pub fn evaluate(date: NaiveDate, now: DateTime<Utc>) -> Self {
        let window = AdmissionWindow::for_week(date);
        Self {
            is_open: window.is_open_at(now),
            window,
        }
    }
}

/// Window state for the current and next week relative to a server instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WindowStatus {
    /// The instant this status was computed at.
    pub server_time: DateTime<Utc>,
    /// The week containing `server_time` (Sunday counts toward next Monday).
    pub current_week: WeekStatus,
    /// The week after `current_week`.
    pub next_week: WeekStatus,
}

impl WindowStatus {
    /// Computes the window status at `now`.
    ///
    /// Pure function of `now` and the policy constants; no I/O.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self {
            server_time: now,
            current_week: WeekStatus::evaluate(today, now),
            next_week: WeekStatus::evaluate(next_week_start(today), now),
        }
    }
}

fn at_utc(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time).and_utc()
}
