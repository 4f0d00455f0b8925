//! `dp-pathway`: the patient pathway state machine.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`suspend`]    | `Suspend` enum (`Continue`, `Hold`, `Await`, `Done`)            |
//! | [`state`]      | `RunState`: waiting lists, weekly tally, run totals             |
//! | [`context`]    | `StageContext<'a>`: clock, config and state for one activation  |
//! | [`model`]      | `PathwayModel` trait                                            |
//! | [`diagnostic`] | `DiagnosticPathway`: referral → triage → … → diagnosis          |
//! | [`error`]      | `PathwayError`, `PathwayResult<T>`                              |
//!
//! # Design notes
//!
//! A patient's journey is an explicit state machine instead of a coroutine.
//! The run resumes a patient by calling `PathwayModel::advance` repeatedly
//! until it returns a suspension:
//!
//! 1. `Continue`: the next state runs immediately at the same time.
//! 2. `Hold(d)`: the patient sleeps until `now + d`.
//! 3. `Await(q)`: the patient requests a unit of pool `q`; if none is
//!    left it waits in that pool's FIFO until the weekly top-up.
//! 4. `Done`: the journey is over and the row is final.
//!
//! Only one patient is advanced at a time, so `RunState` needs no locking.

pub mod context;
pub mod diagnostic;
pub mod error;
pub mod model;
pub mod state;
pub mod suspend;


pub use context::StageContext;
pub use diagnostic::DiagnosticPathway;
pub use error::{PathwayError, PathwayResult};
pub use model::PathwayModel;
pub use state::{QueueTally, RunState, RunTotals, StageTally, WeekTally, Work};
pub use suspend::Suspend;
