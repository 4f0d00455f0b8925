//! Waiting-list prefill.
//!
//! A configured backlog for stage `S` seeds `backlog(S) + capacity(S)`
//! patients that enter directly at `S`'s waiting list.  The extra week of
//! capacity drains the pool at once, so the run starts from a saturated queue
//! of `backlog(S)` patients instead of an empty service.  Assessment-backlog
//! patients are created first, then triage-backlog patients.

use dp_core::{PathwayConfig, QueueStage, SimTime};
use dp_pathway::PathwayModel;
use dp_patient::Origin;
use dp_schedule::ReferralSource;
use tracing::info;

use crate::{Run, RunObserver, SimError, SimResult};

/// Patients to seed for `stage`; zero when no backlog is configured.
pub fn prefill_size(config: &PathwayConfig, stage: QueueStage) -> u32 {
    match config.backlog(stage) {
        0 => 0,
        backlog => backlog + config.capacity(stage),
    }
}

impl<P: PathwayModel, R: ReferralSource> Run<P, R> {
    /// Seed the backlog patients and drive each to its first suspension at
    /// `t = 0`.  Returns the number created.
    ///
    /// Must be called before the first `step_week`, at most once.
    pub fn prefill<O: RunObserver>(&mut self, observer: &mut O) -> SimResult<u32> {
        if self.prefilled {
            return Err(SimError::AlreadyPrefilled);
        }
        if self.next_week > 0 {
            return Err(SimError::PrefillAfterStart(self.next_week));
        }

        let assessment = prefill_size(&self.config, QueueStage::Assessment);
        let triage = prefill_size(&self.config, QueueStage::Triage);
        for _ in 0..assessment {
            self.spawn(Origin::AssessmentBacklog, 0);
        }
        for _ in 0..triage {
            self.spawn(Origin::TriageBacklog, 0);
        }

        self.drain(SimTime::ZERO, true, observer)?;
        self.prefilled = true;
        info!(
            run = self.id.0,
            triage,
            assessment,
            triage_wl = self.state.waiting(QueueStage::Triage),
            assessment_wl = self.state.waiting(QueueStage::Assessment),
            "prefill complete",
        );
        Ok(assessment + triage)
    }

    #[inline]
    pub fn is_prefilled(&self) -> bool {
        self.prefilled
    }
}
