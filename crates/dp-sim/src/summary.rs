//! Weekly aggregate rows and end-of-run summaries.
//!
//! A `WeekRow` covers the interval since the previous snapshot: counts and
//! minutes are sums over that interval, `waiting` is the list size at the
//! snapshot and `max_waiting` the largest size seen during the interval.

use dp_core::{PathwayConfig, QueueMap, RunId, Stage, StageMap};
use dp_pathway::{QueueTally, RunState, StageTally, WeekTally};
use dp_patient::Patient;

// ── WeekRow ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueWeek {
    pub waiting:     u32,
    pub max_waiting: u32,
    pub admitted:    u32,
    /// Mean queue wait (weeks) over this interval's admissions.
    pub mean_wait:   Option<f64>,
    pub target_wait: f64,
    pub breaches:    u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageWeek {
    pub rejected:          u32,
    pub clinical_mins:     f64,
    pub admin_mins:        f64,
    pub notification_mins: f64,
}

impl From<&StageTally> for StageWeek {
    fn from(t: &StageTally) -> Self {
        Self {
            rejected:          t.rejected,
            clinical_mins:     t.clinical_mins,
            admin_mins:        t.admin_mins,
            notification_mins: t.notification_mins,
        }
    }
}

/// One row of the (run, week)-indexed aggregate table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeekRow {
    pub run:       RunId,
    pub week:      u32,
    /// Referrals spawned at this week boundary.
    pub referrals: u32,
    /// Patients in flight at the snapshot.
    pub active:    u32,
    pub accepted:  u32,
    pub queues:    QueueMap<QueueWeek>,
    pub stages:    StageMap<StageWeek>,
    /// Pool levels at the snapshot, before the weekly top-up.
    pub pools:     QueueMap<u32>,
}

impl WeekRow {
    pub fn new(
        run:       RunId,
        week:      u32,
        referrals: u32,
        state:     &RunState,
        tally:     &WeekTally,
        pools:     QueueMap<u32>,
        config:    &PathwayConfig,
    ) -> Self {
        let queues = QueueMap::from_fn(|q| {
            let t: &QueueTally = &tally.queues[q];
            QueueWeek {
                waiting:     state.waiting(q),
                max_waiting: t.max_waiting,
                admitted:    t.admitted,
                mean_wait:   t.mean_wait(),
                target_wait: config.target_wait(q),
                breaches:    t.breaches,
            }
        });
        Self {
            run,
            week,
            referrals,
            active: state.active(),
            accepted: tally.accepted,
            queues,
            stages: tally.stages.map(|t| StageWeek::from(t)),
            pools,
        }
    }

    /// Rejections at every stage this interval.
    pub fn total_rejected(&self) -> u32 {
        self.stages.iter().map(|(_, s)| s.rejected).sum()
    }

    /// Clinical plus admin minutes this interval, all stages.
    pub fn staff_minutes(&self) -> f64 {
        self.stages.iter().map(|(_, s)| s.clinical_mins + s.admin_mins).sum()
    }
}

// ── RunSummary ────────────────────────────────────────────────────────────────

/// Summary scalars for one run, one row of the trial's run-indexed table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub run:           RunId,
    /// Every patient created, prefill backlog included.
    pub arrivals:      u32,
    pub accepted:      u32,
    pub rejected:      StageMap<u32>,
    /// Mean queue wait over every admission in the run.
    pub mean_wait:     QueueMap<Option<f64>>,
    /// Peak waiting-list size over the run.
    pub max_waiting:   QueueMap<u32>,
    /// Waiting-list sizes when the horizon ended.
    pub final_waiting: QueueMap<u32>,
    /// Patients still mid-pathway when the horizon ended.
    pub incomplete:    u32,
}

impl RunSummary {
    pub fn new(run: RunId, arrivals: u32, state: &RunState) -> Self {
        let totals = &state.totals;
        Self {
            run,
            arrivals,
            accepted:      totals.accepted,
            rejected:      totals.rejected,
            mean_wait:     totals.queues.map(QueueTally::mean_wait),
            max_waiting:   totals.queues.map(|t| t.max_waiting),
            final_waiting: QueueMap::from_fn(|q| state.waiting(q)),
            incomplete:    state.active(),
        }
    }

    pub fn total_rejected(&self) -> u32 {
        Stage::ALL.iter().map(|&s| self.rejected[s]).sum()
    }
}

// ── RunOutput ─────────────────────────────────────────────────────────────────

/// Everything one run produces.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunOutput {
    pub summary:  RunSummary,
    /// `horizon + 1` rows, one per week boundary.
    pub weekly:   Vec<WeekRow>,
    /// One row per patient, indexed by `PatientId`.
    pub patients: Vec<Patient>,
}
