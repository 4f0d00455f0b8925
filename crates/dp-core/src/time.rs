//! Simulation time model.
//!
//! # Design
//!
//! Time is continuous and measured in weeks.  Whole-number times are week
//! boundaries: week `w` covers `[w, w + 1)`.  Activity durations are
//! configured in minutes and converted with
//!
//!   weeks = minutes / MINUTES_PER_WEEK
//!
//! `SimTime` wraps an `f64` but is totally ordered (via `f64::total_cmp`) so
//! it can key the event queue's `BTreeMap` directly.

use std::cmp::Ordering;
use std::fmt;

/// Minutes in a simulated week (7 × 24 × 60).
pub const MINUTES_PER_WEEK: f64 = 10_080.0;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation time, or a duration, in weeks.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// The boundary at the start of `week`.
    #[inline]
    pub fn from_week(week: u32) -> SimTime {
        SimTime(week as f64)
    }

    /// A duration of `minutes` expressed in weeks.
    #[inline]
    pub fn from_minutes(minutes: f64) -> SimTime {
        SimTime(minutes / MINUTES_PER_WEEK)
    }

    #[inline]
    pub fn weeks(self) -> f64 {
        self.0
    }

    /// Weeks elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{:.3}", self.0)
    }
}
