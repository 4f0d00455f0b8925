//! Per-run patient storage: `PatientStore` (result rows) and `PatientRngs`.
//!
//! # Why two structs?
//!
//! Advancing a patient needs `&mut Patient` and `&mut PatientRng` at the same
//! time as the run's shared state.  Keeping the RNGs in a parallel
//! `PatientRngs` lets the run borrow both by field without aliasing:
//!
//! ```ignore
//! let patient = run.patients.get_mut(id)?;
//! let rng = run.rngs.get_mut(id)?;
//! run.model.advance(patient, &mut ctx, rng)?;
//! ```
//!
//! Both vectors always have the same length; `PatientId` is the index.

use dp_core::{PatientId, PatientRng, RunId};

use crate::{Origin, Patient};

// ── PatientRngs ───────────────────────────────────────────────────────────────

/// Per-patient deterministic RNG state, parallel to [`PatientStore`].
pub struct PatientRngs {
    seed:      u64,
    pub inner: Vec<PatientRng>,
}

impl PatientRngs {
    pub fn new(run_seed: u64) -> Self {
        Self { seed: run_seed, inner: Vec::new() }
    }

    /// The run seed every patient stream is derived from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn get_mut(&mut self, patient: PatientId) -> Option<&mut PatientRng> {
        self.inner.get_mut(patient.index())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── PatientStore ──────────────────────────────────────────────────────────────

/// Every patient created during one run, indexed by `PatientId`.
///
/// Patients are never removed: a completed journey is a terminal row and an
/// unfinished one is an incomplete row when the horizon ends.
#[derive(Clone, Debug)]
pub struct PatientStore {
    run:      RunId,
    patients: Vec<Patient>,
}

impl PatientStore {
    pub fn new(run: RunId) -> Self {
        Self { run, patients: Vec::new() }
    }

    /// Create a patient and its RNG stream; returns the new id.
    ///
    /// Ids are handed out densely from zero, so they stay valid indices into
    /// both this store and `rngs`.
    pub fn spawn(&mut self, rngs: &mut PatientRngs, origin: Origin, week_added: u32) -> PatientId {
        debug_assert_eq!(self.patients.len(), rngs.len(), "store and rngs out of step");
        let id = PatientId(self.patients.len() as u32);
        self.patients.push(Patient::new(id, self.run, week_added, origin));
        rngs.inner.push(PatientRng::new(rngs.seed, id));
        id
    }

    #[inline]
    pub fn get(&self, patient: PatientId) -> Option<&Patient> {
        self.patients.get(patient.index())
    }

    #[inline]
    pub fn get_mut(&mut self, patient: PatientId) -> Option<&mut Patient> {
        self.patients.get_mut(patient.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.iter()
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    /// Count of patients whose origin is `origin`.
    pub fn count_origin(&self, origin: Origin) -> usize {
        self.patients.iter().filter(|p| p.origin == origin).count()
    }

    /// Hand over the result rows, leaving the store empty.
    pub fn take_rows(&mut self) -> Vec<Patient> {
        std::mem::take(&mut self.patients)
    }
}
