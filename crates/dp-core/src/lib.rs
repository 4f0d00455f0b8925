//! `dp-core`: foundational types for the diagnostic pathway simulator.
//!
//! This crate is a dependency of every other `dp-*` crate.  It intentionally
//! has no `dp-*` dependencies and minimal external ones (`rand`, `rand_distr`
//! and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `PatientId`, `RunId`                                  |
//! | [`time`]        | `SimTime` (continuous weeks), minute conversion       |
//! | [`stage`]       | `Stage`, `QueueStage`, `StageMap`, `QueueMap`         |
//! | [`rng`]         | `PatientRng` (per-patient), `SimRng` (per-run)        |
//! | [`config`]      | `PathwayConfig` and its per-stage sections            |
//! | [`error`]       | `DpError`, `DpResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Configs then load from JSON with per-field defaults.       |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod stage;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    AssessmentConfig, DiagnosisConfig, MdtConfig, ObservationsConfig, PackConfig, PathwayConfig,
    ReferralConfig, SimulationConfig, TriageConfig,
};
pub use error::{DpError, DpResult};
pub use ids::{PatientId, RunId};
pub use rng::{PatientRng, SimRng};
pub use stage::{QueueMap, QueueStage, Stage, StageMap};
pub use time::{MINUTES_PER_WEEK, SimTime};
