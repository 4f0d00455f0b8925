//! `dp-sim`: week loop and trial orchestrator for the diagnostic pathway.
//!
//! # Week loop
//!
//! ```text
//! prefill (if a backlog is configured): seed backlog patients at t = 0
//! for week in 0..=horizon:
//!   ① Drain:     resume every patient whose event time is < week
//!                (≤ 0 at week 0, so prefill settles first).
//!   ② Arrivals:  spawn the week's referral burst at t = week.
//!   ③ Snapshot:  record a WeekRow for the interval just closed.
//!   ④ Top-up:    refill each StagePool to capacity, admitting FIFO waiters.
//! ```
//!
//! Steps ② and ④ are skipped at `week == horizon`, which only records the
//! closing snapshot.
//!
//! # Cargo features
//!
//! | Feature | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on rows and results.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dp_core::PathwayConfig;
//! use dp_sim::Trial;
//!
//! let results = Trial::new(PathwayConfig::default(), 42).run_trial()?;
//! for mean in results.weekly_means() {
//!     println!("{:>3} {:>8.1}", mean.week, mean.waiting[QueueStage::Triage]);
//! }
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod prefill;
pub mod run;
pub mod summary;
pub mod trial;

#[cfg(test)]
mod tests;

pub use builder::RunBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, RunObserver};
pub use prefill::prefill_size;
pub use run::Run;
pub use summary::{QueueWeek, RunOutput, RunSummary, StageWeek, WeekRow};
pub use trial::{Trial, TrialResults, WeekMean};
