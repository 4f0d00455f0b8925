//! Deterministic per-patient and run-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each patient gets its own independent `SmallRng` seeded by:
//!
//!   seed = run_seed XOR (patient_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive patient IDs uniformly across the seed space.
//! A patient's rejection draws and durations therefore depend only on the run
//! seed and its own ID, never on how many other patients were processed
//! before it.  Run-level draws (weekly referral counts) use `SimRng`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::PatientId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Draw from `N(mean, spread)`, redrawing until the sample is strictly positive.
///
/// `mean` must be positive or the loop may not terminate; config validation
/// rejects non-positive means before a run starts.
pub fn positive_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, spread: f64) -> f64 {
    debug_assert!(mean > 0.0, "positive_normal called with mean {mean}");
    loop {
        let z: f64 = rng.sample(StandardNormal);
        let x = mean + spread * z;
        if x > 0.0 {
            return x;
        }
    }
}

// ── PatientRng ────────────────────────────────────────────────────────────────

/// Per-patient deterministic RNG.
///
/// Created alongside each patient and stored in a parallel `Vec<PatientRng>`
/// so the pathway model can borrow a patient and its RNG at the same time.
pub struct PatientRng(SmallRng);

impl PatientRng {
    /// Seed deterministically from the run's seed and a patient ID.
    pub fn new(run_seed: u64, patient: PatientId) -> Self {
        let seed = run_seed ^ (patient.0 as u64).wrapping_mul(MIXING_CONSTANT);
        PatientRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Uniform draw in `[0, 1)` for comparing against a rejection rate.
    #[inline]
    pub fn chance(&mut self) -> f64 {
        self.random::<f64>()
    }

    /// Uniform transit time in `[lo, hi)` weeks, rounded to one decimal.
    #[inline]
    pub fn transit(&mut self, lo: f64, hi: f64) -> f64 {
        (self.0.gen_range(lo..hi) * 10.0).round() / 10.0
    }

    /// Activity duration in minutes drawn from a truncated Gaussian.
    #[inline]
    pub fn minutes(&mut self, mean: f64, spread: f64) -> f64 {
        positive_normal(&mut self.0, mean, spread)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level RNG for draws that belong to no single patient.
///
/// A trial owns one root `SimRng` and derives each run's seed from it with
/// [`SimRng::child_seed`], so run `i` of a trial is reproducible on its own.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a seed for a child RNG at `offset`.
    pub fn child_seed(&mut self, offset: u64) -> u64 {
        self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT)
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
