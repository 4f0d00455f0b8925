//! The per-patient results row.
//!
//! A `Patient` is created at referral or prefill time, mutated in place by the
//! pathway model as it passes each stage, and never removed.  Every duration
//! field starts at zero and is only written by the stage that owns it, so a
//! patient rejected at triage has default pack, observations, MDT and
//! assessment records.
//!
//! The terminal result is a single `Option<Outcome>`; the per-stage
//! "rejected" flags of the results table are derived from it, which makes two
//! terminal flags on one row unrepresentable.

use dp_core::{PatientId, QueueStage, RunId, Stage};

/// How a patient entered the run.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    /// A new referral from the weekly arrival burst.
    #[default]
    Referral,
    /// Seeded at prefill, already waiting for triage.
    TriageBacklog,
    /// Seeded at prefill, already triaged and waiting for assessment.
    AssessmentBacklog,
}

/// The single terminal state of a completed journey.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Rejected(Stage),
    /// Accepted into the service at diagnosis.
    Accepted,
}

impl Outcome {
    /// The stage that rejected the patient, or `None` if accepted.
    #[inline]
    pub fn rejection_stage(self) -> Option<Stage> {
        match self {
            Outcome::Rejected(stage) => Some(stage),
            Outcome::Accepted => None,
        }
    }
}

/// The pathway state a patient resumes in on its next activation.
///
/// Queue states (`Triage`, `Mdt`, `Assessment`) are entered only after a pool
/// unit has been granted; `Join*` states record the waiting-list join.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    #[default]
    Screening,
    JoinTriage,
    Triage,
    Pack,
    PackReturn,
    Observations,
    ObservationsReturn,
    MdtPrep,
    JoinMdt,
    Mdt,
    JoinAssessment,
    Assessment,
    /// Holding for the terminal notification; the outcome is already set.
    Notify,
    Done,
}

// ── Per-stage records ─────────────────────────────────────────────────────────

/// Queue bookkeeping shared by the three pool-gated stages.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueRecord {
    /// Waiting-list size including this patient at the moment it joined.
    pub wl_position: u32,
    /// Simulated time (weeks) at which the patient joined the waiting list.
    pub joined_at:   f64,
    /// Weeks between joining and admission, plus any backlog offset.
    pub queue_wait:  f64,
    /// Sampled journey time (weeks) recorded on admission.
    pub transit:     f64,
}

impl QueueRecord {
    /// Queue wait plus recorded transit time.
    #[inline]
    pub fn total_time(&self) -> f64 {
        self.queue_wait + self.transit
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferralRecord {
    pub screening_mins: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriageRecord {
    pub queue:             QueueRecord,
    pub clinical_mins:     f64,
    pub admin_mins:        f64,
    pub notification_mins: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackRecord {
    pub admin_mins:        f64,
    /// Weeks the pack took to come back; late returns are rejections.
    pub return_time:       f64,
    pub notification_mins: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservationsRecord {
    pub visit_mins:        f64,
    pub return_time:       f64,
    pub notification_mins: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MdtRecord {
    pub prep_mins:         f64,
    pub meeting_mins:      f64,
    pub queue:             QueueRecord,
    pub notification_mins: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssessmentRecord {
    pub queue:         QueueRecord,
    pub clinical_mins: f64,
    pub admin_mins:    f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosisRecord {
    pub notification_mins: f64,
}

// ── Patient ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patient {
    pub id:           PatientId,
    pub run:          RunId,
    pub week_added:   u32,
    pub origin:       Origin,
    pub step:         Step,
    pub outcome:      Option<Outcome>,

    pub referral:     ReferralRecord,
    pub triage:       TriageRecord,
    pub pack:         PackRecord,
    pub observations: ObservationsRecord,
    pub mdt:          MdtRecord,
    pub assessment:   AssessmentRecord,
    pub diagnosis:    DiagnosisRecord,
}

impl Patient {
    /// A fresh patient positioned at the entry state for its origin.
    pub fn new(id: PatientId, run: RunId, week_added: u32, origin: Origin) -> Self {
        let step = match origin {
            Origin::Referral => Step::Screening,
            Origin::TriageBacklog => Step::JoinTriage,
            Origin::AssessmentBacklog => Step::JoinAssessment,
        };
        Self {
            id,
            run,
            week_added,
            origin,
            step,
            outcome:      None,
            referral:     ReferralRecord::default(),
            triage:       TriageRecord::default(),
            pack:         PackRecord::default(),
            observations: ObservationsRecord::default(),
            mdt:          MdtRecord::default(),
            assessment:   AssessmentRecord::default(),
            diagnosis:    DiagnosisRecord::default(),
        }
    }

    #[inline]
    pub fn rejected_at(&self, stage: Stage) -> bool {
        self.outcome.and_then(Outcome::rejection_stage) == Some(stage)
    }

    #[inline]
    pub fn accepted(&self) -> bool {
        self.outcome == Some(Outcome::Accepted)
    }

    /// `true` once the journey has reached `Step::Done`.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.step == Step::Done
    }

    /// Queue record for a pool-gated stage.
    pub fn queue(&self, stage: QueueStage) -> &QueueRecord {
        match stage {
            QueueStage::Triage => &self.triage.queue,
            QueueStage::Mdt => &self.mdt.queue,
            QueueStage::Assessment => &self.assessment.queue,
        }
    }

    pub fn queue_mut(&mut self, stage: QueueStage) -> &mut QueueRecord {
        match stage {
            QueueStage::Triage => &mut self.triage.queue,
            QueueStage::Mdt => &mut self.mdt.queue,
            QueueStage::Assessment => &mut self.assessment.queue,
        }
    }

    /// Every staff minute recorded on this patient, all stages combined.
    pub fn total_minutes(&self) -> f64 {
        self.referral.screening_mins
            + self.triage.clinical_mins
            + self.triage.admin_mins
            + self.triage.notification_mins
            + self.pack.admin_mins
            + self.pack.notification_mins
            + self.observations.visit_mins
            + self.observations.notification_mins
            + self.mdt.prep_mins
            + self.mdt.meeting_mins
            + self.mdt.notification_mins
            + self.assessment.clinical_mins
            + self.assessment.admin_mins
            + self.diagnosis.notification_mins
    }
}
