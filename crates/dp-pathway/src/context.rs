//! Mutable stage context passed to every pathway activation.

use dp_core::{PathwayConfig, PatientRng, SimTime};

use crate::RunState;

/// The clock, configuration and run state one activation may touch.
///
/// Built by the run for each resumed patient.  The run holds no other
/// borrow of its `RunState` while the context is live.
pub struct StageContext<'a> {
    /// Current simulated time.
    pub now: SimTime,

    pub config: &'a PathwayConfig,

    pub state: &'a mut RunState,
}

impl<'a> StageContext<'a> {
    #[inline]
    pub fn new(now: SimTime, config: &'a PathwayConfig, state: &'a mut RunState) -> Self {
        Self { now, config, state }
    }

    /// Sample an activity duration around `mean` minutes with the configured spread.
    #[inline]
    pub fn minutes(&self, rng: &mut PatientRng, mean: f64) -> f64 {
        rng.minutes(mean, self.config.simulation.duration_spread)
    }
}
