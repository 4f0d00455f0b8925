//! Suspensions: how a pathway step hands control back to the run.

use dp_core::{QueueStage, SimTime};

/// What the run should do with a patient after one `advance` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suspend {
    /// Run the next state now, at the same simulated time.
    Continue,

    /// Resume after this duration (weeks).
    ///
    /// Inserted into the `EventQueue` at `now + duration` by the run.
    Hold(SimTime),

    /// Take one unit from this stage's pool, queueing FIFO if it is empty.
    Await(QueueStage),

    /// The journey has ended; the patient is never resumed again.
    Done,
}

impl Suspend {
    /// Hold for a duration given in staff minutes.
    #[inline]
    pub fn hold_minutes(minutes: f64) -> Suspend {
        Suspend::Hold(SimTime::from_minutes(minutes))
    }
}
