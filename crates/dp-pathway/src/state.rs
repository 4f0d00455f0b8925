//! Per-run mutable simulation state.
//!
//! `RunState` is owned by exactly one run and replaces process-wide counters:
//! the three waiting lists, the number of in-flight patients, the tally for
//! the current weekly interval, and cumulative totals for the run summary.

use dp_core::{QueueMap, QueueStage, Stage, StageMap};

/// Kind of staff time an activity consumes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Work {
    Clinical,
    Admin,
    Notification,
}

// ── Tallies ───────────────────────────────────────────────────────────────────

/// Waiting-list statistics for one queue over some interval.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueueTally {
    /// Largest waiting-list size seen in the interval.
    pub max_waiting: u32,
    pub admitted:    u32,
    /// Sum of queue waits (weeks) over `admitted` patients.
    pub wait_sum:    f64,
    /// Admissions whose wait exceeded the stage's target.
    pub breaches:    u32,
}

impl QueueTally {
    pub fn mean_wait(&self) -> Option<f64> {
        (self.admitted > 0).then(|| self.wait_sum / self.admitted as f64)
    }
}

/// Rejections and staff minutes for one stage over an interval.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageTally {
    pub rejected:          u32,
    pub clinical_mins:     f64,
    pub admin_mins:        f64,
    pub notification_mins: f64,
}

impl StageTally {
    #[inline]
    fn add(&mut self, work: Work, minutes: f64) {
        match work {
            Work::Clinical => self.clinical_mins += minutes,
            Work::Admin => self.admin_mins += minutes,
            Work::Notification => self.notification_mins += minutes,
        }
    }
}

/// Everything recorded since the last weekly snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeekTally {
    pub queues:   QueueMap<QueueTally>,
    pub stages:   StageMap<StageTally>,
    pub accepted: u32,
}

/// Cumulative counts over the whole run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunTotals {
    /// `max_waiting` here is the peak over the whole run.
    pub queues:   QueueMap<QueueTally>,
    pub rejected: StageMap<u32>,
    pub accepted: u32,
}

// ── RunState ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct RunState {
    waiting:    QueueMap<u32>,
    active:     u32,
    pub week:   WeekTally,
    pub totals: RunTotals,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patients currently on `queue`'s waiting list.
    #[inline]
    pub fn waiting(&self, queue: QueueStage) -> u32 {
        self.waiting[queue]
    }

    /// Patients created but not yet finished.
    #[inline]
    pub fn active(&self) -> u32 {
        self.active
    }

    /// A patient was created.
    #[inline]
    pub fn enter(&mut self) {
        self.active += 1;
    }

    /// A patient finished its journey.
    #[inline]
    pub fn discharge(&mut self) {
        debug_assert!(self.active > 0, "discharge with no active patients");
        self.active = self.active.saturating_sub(1);
    }

    /// Add a patient to `queue`'s waiting list; returns the new list size.
    pub fn join(&mut self, queue: QueueStage) -> u32 {
        self.waiting[queue] += 1;
        let n = self.waiting[queue];
        let week = &mut self.week.queues[queue];
        week.max_waiting = week.max_waiting.max(n);
        let run = &mut self.totals.queues[queue];
        run.max_waiting = run.max_waiting.max(n);
        n
    }

    /// Remove a patient from `queue`'s waiting list on admission.
    ///
    /// Returns `false` (leaving the counter untouched) if the list is empty.
    #[must_use]
    pub fn admit(&mut self, queue: QueueStage, wait: f64, target: f64) -> bool {
        let Some(n) = self.waiting[queue].checked_sub(1) else {
            return false;
        };
        self.waiting[queue] = n;
        let breach = u32::from(wait > target);
        for tally in [&mut self.week.queues[queue], &mut self.totals.queues[queue]] {
            tally.admitted += 1;
            tally.wait_sum += wait;
            tally.breaches += breach;
        }
        true
    }

    pub fn reject(&mut self, stage: Stage) {
        self.week.stages[stage].rejected += 1;
        self.totals.rejected[stage] += 1;
    }

    pub fn accept(&mut self) {
        self.week.accepted += 1;
        self.totals.accepted += 1;
    }

    /// Attribute `minutes` of staff time to `stage`.
    #[inline]
    pub fn record(&mut self, stage: Stage, work: Work, minutes: f64) {
        self.week.stages[stage].add(work, minutes);
    }

    /// Close the current interval.
    ///
    /// The next interval's `max_waiting` starts from the lists carried in.
    pub fn take_week(&mut self) -> WeekTally {
        let mut next = WeekTally::default();
        for queue in QueueStage::ALL {
            next.queues[queue].max_waiting = self.waiting[queue];
        }
        std::mem::replace(&mut self.week, next)
    }

    /// Zero the waiting lists (end of run).
    pub fn clear_waiting(&mut self) {
        self.waiting = QueueMap::default();
    }
}
