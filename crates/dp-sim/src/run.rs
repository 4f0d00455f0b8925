//! The `Run` struct, its week loop and its event loop.

use dp_core::{
    DpError, PathwayConfig, PatientId, QueueMap, QueueStage, RunId, SimRng, SimTime,
};
use dp_pathway::{PathwayModel, RunState, StageContext, Suspend};
use dp_patient::{Origin, PatientRngs, PatientStore};
use dp_schedule::{Admission, EventQueue, ReferralSource, StagePool};
use tracing::{debug, info, trace};

use crate::{RunObserver, RunOutput, RunSummary, SimError, SimResult, WeekRow};

// ── Run ───────────────────────────────────────────────────────────────────────

/// One stochastic execution of the pathway over the configured horizon.
///
/// `Run<P, R>` owns its clock, pools, waiting lists and result tables, so two
/// runs never share mutable state.  Each week boundary `w` in `0..=horizon`:
///
/// 1. **Drain**: resume every patient whose event time is before `w`.
/// 2. **Arrivals**: spawn this week's referral burst at `t = w`.
/// 3. **Snapshot**: record the interval's `WeekRow`.
/// 4. **Top-up**: add each pool's shortfall and admit FIFO waiters.
///
/// The final boundary (`w == horizon`) only snapshots, so a run records
/// `horizon + 1` rows.  Events at or after the horizon are abandoned.
///
/// Create via [`RunBuilder`][crate::RunBuilder].
pub struct Run<P: PathwayModel, R: ReferralSource> {
    /// Immutable for the whole run.
    pub config: PathwayConfig,

    pub id: RunId,

    /// Current simulated time.
    pub now: SimTime,

    /// Every patient created so far, including unfinished ones.
    pub patients: PatientStore,

    /// Per-patient deterministic RNGs, separated for the split-borrow pattern.
    pub rngs: PatientRngs,

    /// Run-level RNG for weekly referral picks.
    pub rng: SimRng,

    /// Pending duration suspensions (`BTreeMap<SimTime, Vec<PatientId>>`).
    pub events: EventQueue,

    pub pools: QueueMap<StagePool>,

    pub state: RunState,

    pub model: P,

    pub referrals: R,

    pub weekly: Vec<WeekRow>,

    pub(crate) next_week: u32,
    pub(crate) prefilled: bool,
}

impl<P: PathwayModel, R: ReferralSource> Run<P, R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current week through the horizon and collect the output.
    ///
    /// Use [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: RunObserver>(&mut self, observer: &mut O) -> SimResult<RunOutput> {
        while !self.is_complete() {
            self.step_week(observer)?;
        }
        Ok(self.finish(observer))
    }

    /// Process exactly `n` week boundaries from the current position.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_weeks<O: RunObserver>(&mut self, n: u32, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step_week(observer)?;
        }
        Ok(())
    }

    /// Process the next week boundary; returns the week just recorded.
    ///
    /// At week 0 a configured backlog is prefilled first unless
    /// [`prefill`](Self::prefill) already ran.
    pub fn step_week<O: RunObserver>(&mut self, observer: &mut O) -> SimResult<u32> {
        let week = self.next_week;
        let horizon = self.config.simulation.horizon_weeks;
        if week > horizon {
            return Err(SimError::HorizonReached(horizon));
        }

        let boundary = SimTime::from_week(week);
        if week == 0 {
            if self.config.simulation.has_backlog() && !self.prefilled {
                self.prefill(observer)?;
            }
            self.drain(boundary, true, observer)?;
        } else {
            self.drain(boundary, false, observer)?;
        }
        self.now = boundary;
        observer.on_week_start(self.id, week);

        let open = week < horizon;
        let referrals = if open { self.spawn_referrals(week) } else { 0 };

        let tally = self.state.take_week();
        let pools = self.pools.map(StagePool::level);
        let row = WeekRow::new(self.id, week, referrals, &self.state, &tally, pools, &self.config);
        debug!(
            run = self.id.0,
            week,
            referrals,
            active = row.active,
            triage_wl = row.queues[QueueStage::Triage].waiting,
            mdt_wl = row.queues[QueueStage::Mdt].waiting,
            assessment_wl = row.queues[QueueStage::Assessment].waiting,
            "week snapshot",
        );
        observer.on_snapshot(&row);
        self.weekly.push(row);

        if open {
            self.top_up_pools();
        }
        self.next_week += 1;
        Ok(week)
    }

    /// `true` once the closing snapshot at the horizon has been recorded.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.next_week > self.config.simulation.horizon_weeks
    }

    /// The next week boundary `step_week` will process.
    #[inline]
    pub fn next_week(&self) -> u32 {
        self.next_week
    }

    #[inline]
    pub fn pool(&self, queue: QueueStage) -> &StagePool {
        &self.pools[queue]
    }

    #[inline]
    pub fn waiting(&self, queue: QueueStage) -> u32 {
        self.state.waiting(queue)
    }

    /// Build the summary, hand over the result tables and zero the waiting
    /// lists.  The run records nothing further afterwards.
    pub fn finish<O: RunObserver>(&mut self, observer: &mut O) -> RunOutput {
        let summary = RunSummary::new(self.id, self.patients.len() as u32, &self.state);
        observer.on_run_end(&summary);
        info!(
            run = self.id.0,
            arrivals = summary.arrivals,
            accepted = summary.accepted,
            rejected = summary.total_rejected(),
            incomplete = summary.incomplete,
            "run complete",
        );
        self.state.clear_waiting();
        RunOutput {
            summary,
            weekly:   std::mem::take(&mut self.weekly),
            patients: self.patients.take_rows(),
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────

    /// Create a patient at the current time and schedule its first activation.
    pub(crate) fn spawn(&mut self, origin: Origin, week: u32) -> PatientId {
        let id = self.patients.spawn(&mut self.rngs, origin, week);
        self.state.enter();
        self.events.push(self.now, id);
        id
    }

    fn spawn_referrals(&mut self, week: u32) -> u32 {
        let n = self.referrals.referrals(week, &mut self.rng);
        for _ in 0..n {
            self.spawn(Origin::Referral, week);
        }
        n
    }

    fn top_up_pools(&mut self) {
        for queue in QueueStage::ALL {
            let admitted = self.pools[queue].top_up();
            if !admitted.is_empty() {
                trace!(run = self.id.0, stage = %queue, admitted = admitted.len(), "top-up admissions");
            }
            for id in admitted {
                self.events.push(self.now, id);
            }
        }
    }

    /// Resume every event before `limit` (or at it, when `inclusive`), in
    /// time order.
    pub(crate) fn drain<O: RunObserver>(
        &mut self,
        limit:     SimTime,
        inclusive: bool,
        observer:  &mut O,
    ) -> SimResult<()> {
        loop {
            let next = if inclusive {
                self.events.pop_through(limit)
            } else {
                self.events.pop_before(limit)
            };
            let Some((time, batch)) = next else {
                return Ok(());
            };
            self.now = time;
            for id in batch {
                self.resume(id, observer)?;
            }
        }
    }

    /// Advance one patient until it suspends.
    fn resume<O: RunObserver>(&mut self, id: PatientId, observer: &mut O) -> SimResult<()> {
        let (Some(patient), Some(rng)) = (self.patients.get_mut(id), self.rngs.get_mut(id)) else {
            return Err(DpError::PatientNotFound(id).into());
        };
        let mut ctx = StageContext::new(self.now, &self.config, &mut self.state);
        loop {
            match self.model.advance(patient, &mut ctx, rng)? {
                Suspend::Continue => {}
                Suspend::Hold(delay) => {
                    self.events.push(ctx.now + delay, id);
                    return Ok(());
                }
                Suspend::Await(queue) => match self.pools[queue].request(id) {
                    Admission::Granted => {}
                    Admission::Queued { position } => {
                        trace!(patient = %id, stage = %queue, position, "queued for pool");
                        return Ok(());
                    }
                },
                Suspend::Done => {
                    ctx.state.discharge();
                    observer.on_patient_done(patient);
                    return Ok(());
                }
            }
        }
    }
}
