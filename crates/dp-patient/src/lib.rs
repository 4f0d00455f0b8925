//! `dp-patient`: patient records and per-run patient storage.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`patient`]     | `Patient`, `Origin`, `Outcome`, `Step`, per-stage records |
//! | [`store`]       | `PatientStore` (results rows), `PatientRngs` (per-patient RNG) |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `serde`    | Derives `Serialize`/`Deserialize` on all public types.     |

pub mod patient;
pub mod store;


pub use patient::{
    AssessmentRecord, DiagnosisRecord, MdtRecord, ObservationsRecord, Origin, Outcome, PackRecord,
    Patient, QueueRecord, ReferralRecord, Step, TriageRecord,
};
pub use store::{PatientRngs, PatientStore};
