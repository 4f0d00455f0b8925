//! Run observer trait for progress reporting and data collection.

use dp_core::RunId;
use dp_patient::Patient;

use crate::{RunSummary, WeekRow};

/// Callbacks invoked by [`Run::run`][crate::Run::run] at key points in the
/// week loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: breach alarm
///
/// ```rust,ignore
/// struct BreachAlarm;
///
/// impl RunObserver for BreachAlarm {
///     fn on_snapshot(&mut self, row: &WeekRow) {
///         let triage = &row.queues[QueueStage::Triage];
///         if triage.breaches > 0 {
///             println!("run {} week {}: {} triage breaches", row.run.0, row.week, triage.breaches);
///         }
///     }
/// }
/// ```
pub trait RunObserver {
    /// Called at each week boundary, after the previous week's events ran
    /// and before this week's referrals arrive.
    fn on_week_start(&mut self, _run: RunId, _week: u32) {}

    /// Called with each weekly aggregate row as it is recorded.
    fn on_snapshot(&mut self, _row: &WeekRow) {}

    /// Called once when a patient's journey reaches its terminal state.
    fn on_patient_done(&mut self, _patient: &Patient) {}

    /// Called once after the final snapshot of a run.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`RunObserver`] that does nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
