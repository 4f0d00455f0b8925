//! `ReferralSource`: how many new referrals arrive each week.
//!
//! The run asks its source once per week for a count and spawns that many
//! patients at the week boundary.
//!
//! # Sources
//!
//! - [`PoissonReferrals`]: the default.  Draws a buffer of
//!   [`POISSON_BUFFER_LEN`] Poisson(λ) samples once per run and picks one
//!   uniformly each week.
//! - [`FixedReferrals`]: a scripted per-week count, for controlled scenarios.
//!
//! Sources compose: `a.plus(b)` yields the sum of both counts each week.

use rand_distr::{Distribution, Poisson};

use dp_core::SimRng;

use crate::{ScheduleError, ScheduleResult};

/// Size of the pre-sampled Poisson buffer.
pub const POISSON_BUFFER_LEN: usize = 1_000;

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Weekly referral count generator.
///
/// # Contract
///
/// - Must be deterministic given the same `rng` state.
/// - `prepare` runs once before week 0; it may draw from `rng`.
pub trait ReferralSource: Send {
    fn prepare(&mut self, _rng: &mut SimRng) -> ScheduleResult<()> {
        Ok(())
    }

    /// Number of referrals arriving at the start of `week`.
    fn referrals(&mut self, week: u32, rng: &mut SimRng) -> u32;

    /// `false` only if every week's count is guaranteed to be zero.
    fn may_refer(&self) -> bool {
        true
    }
}

// ── Poisson ───────────────────────────────────────────────────────────────────

pub struct PoissonReferrals {
    rate:   f64,
    buffer: Vec<u32>,
}

impl PoissonReferrals {
    pub fn new(rate: f64) -> Self {
        Self { rate, buffer: Vec::new() }
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// The pre-sampled counts.  Empty until `prepare` has run.
    pub fn buffer(&self) -> &[u32] {
        &self.buffer
    }
}

impl ReferralSource for PoissonReferrals {
    fn prepare(&mut self, rng: &mut SimRng) -> ScheduleResult<()> {
        if self.rate == 0.0 {
            self.buffer = vec![0; POISSON_BUFFER_LEN];
            return Ok(());
        }
        let dist = Poisson::new(self.rate).map_err(|e| {
            ScheduleError::Distribution(format!("poisson rate {}: {e}", self.rate))
        })?;
        self.buffer = (0..POISSON_BUFFER_LEN)
            .map(|_| dist.sample(rng.inner()) as u32)
            .collect();
        Ok(())
    }

    fn referrals(&mut self, _week: u32, rng: &mut SimRng) -> u32 {
        rng.choose(&self.buffer).copied().unwrap_or(0)
    }

    fn may_refer(&self) -> bool {
        self.rate > 0.0
    }
}

// ── Fixed ─────────────────────────────────────────────────────────────────────

/// Scripted counts: `counts[week]`, then `after` for every later week.
pub struct FixedReferrals {
    counts: Vec<u32>,
    after:  u32,
}

impl FixedReferrals {
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts, after: 0 }
    }

    /// The same count every week.
    pub fn constant(per_week: u32) -> Self {
        Self { counts: Vec::new(), after: per_week }
    }

    /// No referrals at all.
    pub fn none() -> Self {
        Self::constant(0)
    }

    /// Count used once the scripted weeks run out.
    pub fn then(mut self, per_week: u32) -> Self {
        self.after = per_week;
        self
    }
}

impl ReferralSource for FixedReferrals {
    #[inline]
    fn referrals(&mut self, week: u32, _rng: &mut SimRng) -> u32 {
        self.counts.get(week as usize).copied().unwrap_or(self.after)
    }

    fn may_refer(&self) -> bool {
        self.after > 0 || self.counts.iter().any(|&n| n > 0)
    }
}

// ── Combined ──────────────────────────────────────────────────────────────────

/// Sums two sources each week, e.g. a Poisson baseline plus a scripted surge.
/// Construct with `a.plus(b)`.
pub struct CombinedReferrals<A: ReferralSource, B: ReferralSource> {
    first:  A,
    second: B,
}

impl<A: ReferralSource, B: ReferralSource> ReferralSource for CombinedReferrals<A, B> {
    fn prepare(&mut self, rng: &mut SimRng) -> ScheduleResult<()> {
        self.first.prepare(rng)?;
        self.second.prepare(rng)
    }

    fn referrals(&mut self, week: u32, rng: &mut SimRng) -> u32 {
        let a = self.first.referrals(week, rng);
        a.saturating_add(self.second.referrals(week, rng))
    }

    fn may_refer(&self) -> bool {
        self.first.may_refer() || self.second.may_refer()
    }
}

/// Extension trait that adds `.plus(other)` to any `ReferralSource`.
pub trait ReferralSourceExt: ReferralSource + Sized {
    fn plus<B: ReferralSource>(self, other: B) -> CombinedReferrals<Self, B> {
        CombinedReferrals { first: self, second: other }
    }
}

impl<S: ReferralSource + Sized> ReferralSourceExt for S {}
