//! Trial orchestration: `number_of_runs` independent runs over one config.

use std::collections::BTreeMap;

use dp_core::{PathwayConfig, QueueMap, QueueStage, RunId, SimRng};
use dp_patient::Patient;
use dp_schedule::{PoissonReferrals, ReferralSource};
use tracing::info;

use crate::{NoopObserver, RunBuilder, RunObserver, RunSummary, SimResult, WeekRow};

// ── Trial ─────────────────────────────────────────────────────────────────────

/// Repeats a run `config.simulation.number_of_runs` times.
///
/// Run `i` is seeded from the trial seed through a root `SimRng`, so a trial
/// with the same config and seed reproduces every run exactly.  Runs execute
/// one after another and share nothing but the immutable config.
#[derive(Clone, Debug)]
pub struct Trial {
    config: PathwayConfig,
    seed:   u64,
}

impl Trial {
    pub fn new(config: PathwayConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    /// Use `config.simulation.seed` as the trial seed.
    pub fn from_config(config: PathwayConfig) -> Self {
        let seed = config.simulation.seed;
        Self::new(config, seed)
    }

    #[inline]
    pub fn config(&self) -> &PathwayConfig {
        &self.config
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run every replication with Poisson referrals and no observer.
    pub fn run_trial(&self) -> SimResult<TrialResults> {
        self.run_trial_with(&mut NoopObserver)
    }

    pub fn run_trial_with<O: RunObserver>(&self, observer: &mut O) -> SimResult<TrialResults> {
        let rate = self.config.referral.arrival_rate;
        self.run_trial_using(|_| PoissonReferrals::new(rate), observer)
    }

    /// Run every replication, building each run's referral source with `make`.
    pub fn run_trial_using<R, F, O>(&self, mut make: F, observer: &mut O) -> SimResult<TrialResults>
    where
        R: ReferralSource,
        F: FnMut(RunId) -> R,
        O: RunObserver,
    {
        self.config.validate()?;

        let runs = self.config.simulation.number_of_runs;
        let mut root = SimRng::new(self.seed);
        let mut results = TrialResults::with_capacity(runs as usize);
        for i in 0..runs {
            let id = RunId(i);
            let run_seed = root.child_seed(u64::from(i));
            let mut run = RunBuilder::new(self.config.clone(), id, run_seed)
                .referrals(make(id))
                .build()?;
            let output = run.run(observer)?;
            results.summaries.push(output.summary);
            results.weekly.extend(output.weekly);
            results.patients.extend(output.patients);
        }

        info!(
            runs,
            seed = self.seed,
            patients = results.patients.len(),
            weekly_rows = results.weekly.len(),
            "trial complete",
        );
        Ok(results)
    }
}

// ── TrialResults ──────────────────────────────────────────────────────────────

/// Concatenated tables from every run, each row tagged with its `RunId`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialResults {
    /// One row per run, in run order.
    pub summaries: Vec<RunSummary>,
    /// `number_of_runs * (horizon + 1)` rows, ordered by (run, week).
    pub weekly:    Vec<WeekRow>,
    pub patients:  Vec<Patient>,
}

/// Waiting lists averaged over every run for one week.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeekMean {
    pub week:      u32,
    pub runs:      u32,
    pub referrals: f64,
    pub waiting:   QueueMap<f64>,
}

impl TrialResults {
    fn with_capacity(runs: usize) -> Self {
        Self { summaries: Vec::with_capacity(runs), ..Self::default() }
    }

    #[inline]
    pub fn runs(&self) -> usize {
        self.summaries.len()
    }

    pub fn run_weekly(&self, run: RunId) -> impl Iterator<Item = &WeekRow> {
        self.weekly.iter().filter(move |r| r.run == run)
    }

    pub fn run_patients(&self, run: RunId) -> impl Iterator<Item = &Patient> {
        self.patients.iter().filter(move |p| p.run == run)
    }

    /// Per-week mean of referrals and waiting-list sizes across runs.
    pub fn weekly_means(&self) -> Vec<WeekMean> {
        let mut weeks: BTreeMap<u32, (u32, f64, QueueMap<f64>)> = BTreeMap::new();
        for row in &self.weekly {
            let (runs, referrals, waiting) = weeks.entry(row.week).or_default();
            *runs += 1;
            *referrals += f64::from(row.referrals);
            for queue in QueueStage::ALL {
                waiting[queue] += f64::from(row.queues[queue].waiting);
            }
        }
        weeks
            .into_iter()
            .map(|(week, (runs, referrals, waiting))| {
                let n = f64::from(runs);
                WeekMean {
                    week,
                    runs,
                    referrals: referrals / n,
                    waiting: waiting.map(|w| w / n),
                }
            })
            .collect()
    }

    /// Mean over runs of each run's mean queue wait; runs with no admissions
    /// at `queue` are skipped.
    pub fn mean_wait(&self, queue: QueueStage) -> Option<f64> {
        let waits: Vec<f64> = self.summaries.iter().filter_map(|s| s.mean_wait[queue]).collect();
        (!waits.is_empty()).then(|| waits.iter().sum::<f64>() / waits.len() as f64)
    }

    /// Largest waiting list seen at `queue` in any run.
    pub fn max_waiting(&self, queue: QueueStage) -> u32 {
        self.summaries.iter().map(|s| s.max_waiting[queue]).max().unwrap_or(0)
    }
}
