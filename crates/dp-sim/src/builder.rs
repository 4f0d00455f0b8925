//! Fluent builder for constructing a [`Run`].

use dp_core::{PathwayConfig, QueueMap, RunId, SimRng, SimTime};
use dp_pathway::{DiagnosticPathway, PathwayModel, RunState};
use dp_patient::{PatientRngs, PatientStore};
use dp_schedule::{EventQueue, PoissonReferrals, ReferralSource, StagePool};

use crate::{Run, SimResult};

/// Offset of the patient-stream seed derived from the run seed.
const PATIENT_SEED_OFFSET: u64 = 1;

/// Fluent builder for [`Run<P, R>`].
///
/// # Required inputs
///
/// - [`PathwayConfig`]: rates, durations, capacities, horizon
/// - [`RunId`]: the run's index within its trial
/// - `seed`: the run seed; equal seeds give identical runs
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                          |
/// |-------------------|--------------------------------------------------|
/// | `.model(m)`       | `DiagnosticPathway`                              |
/// | `.referrals(s)`   | `PoissonReferrals` at `config.referral.arrival_rate` |
///
/// # Example
///
/// ```rust,ignore
/// let mut run = RunBuilder::new(config, RunId(0), 42)
///     .referrals(FixedReferrals::new(vec![1]))
///     .build()?;
/// let output = run.run(&mut NoopObserver)?;
/// ```
pub struct RunBuilder<P: PathwayModel = DiagnosticPathway, R: ReferralSource = PoissonReferrals> {
    config:    PathwayConfig,
    id:        RunId,
    seed:      u64,
    model:     P,
    referrals: R,
}

impl RunBuilder {
    /// Create a builder with the standard pathway and Poisson referrals.
    pub fn new(config: PathwayConfig, id: RunId, seed: u64) -> Self {
        let referrals = PoissonReferrals::new(config.referral.arrival_rate);
        Self { config, id, seed, model: DiagnosticPathway, referrals }
    }
}

impl<P: PathwayModel, R: ReferralSource> RunBuilder<P, R> {
    /// Replace the pathway model.
    pub fn model<Q: PathwayModel>(self, model: Q) -> RunBuilder<Q, R> {
        RunBuilder {
            config:    self.config,
            id:        self.id,
            seed:      self.seed,
            model,
            referrals: self.referrals,
        }
    }

    /// Replace the weekly referral source.
    pub fn referrals<S: ReferralSource>(self, referrals: S) -> RunBuilder<P, S> {
        RunBuilder {
            config: self.config,
            id:     self.id,
            seed:   self.seed,
            model:  self.model,
            referrals,
        }
    }

    /// Validate the configuration, prepare the referral source, fill the
    /// pools and return a ready-to-run [`Run`].
    pub fn build(mut self) -> SimResult<Run<P, R>> {
        self.config.validate_with(self.referrals.may_refer())?;

        let mut rng = SimRng::new(self.seed);
        let patient_seed = rng.child_seed(PATIENT_SEED_OFFSET);
        self.referrals.prepare(&mut rng)?;

        let config = self.config;
        let pools = QueueMap::from_fn(|q| StagePool::new(config.capacity(q)));

        Ok(Run {
            id:        self.id,
            now:       SimTime::ZERO,
            patients:  PatientStore::new(self.id),
            rngs:      PatientRngs::new(patient_seed),
            rng,
            events:    EventQueue::new(),
            pools,
            state:     RunState::new(),
            model:     self.model,
            referrals: self.referrals,
            weekly:    Vec::with_capacity(config.simulation.horizon_weeks as usize + 1),
            next_week: 0,
            prefilled: false,
            config,
        })
    }
}
