//! `dp-schedule`: event queue, weekly resource pools, and referral arrivals.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`event_queue`] | `EventQueue` (`BTreeMap<SimTime, Vec<PatientId>>`)        |
//! | [`pool`]        | `StagePool` (depletable weekly counter), `Admission`      |
//! | [`arrivals`]    | `ReferralSource` trait, `PoissonReferrals`, `FixedReferrals`, `CombinedReferrals` |
//! | [`error`]       | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Time model (summary)
//!
//! A patient suspends either for a duration or on a pool.  A duration
//! suspension becomes an `EventQueue` entry at `now + delay`; a pool
//! suspension parks the patient in the pool's FIFO until the weekly top-up
//! grants it a unit:
//!
//! ```text
//! shortfall = capacity − level
//! level    += shortfall          // never reset, only topped up
//! while level > 0 and waiters:   // FIFO
//!     level -= 1; admit(waiters.pop_front())
//! ```

pub mod arrivals;
pub mod error;
pub mod event_queue;
pub mod pool;

#[cfg(test)]
mod tests;

pub use arrivals::{
    CombinedReferrals, FixedReferrals, POISSON_BUFFER_LEN, PoissonReferrals, ReferralSource,
    ReferralSourceExt,
};
pub use error::{ScheduleError, ScheduleResult};
pub use event_queue::EventQueue;
pub use pool::{Admission, StagePool};
