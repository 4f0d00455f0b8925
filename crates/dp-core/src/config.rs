//! Pathway configuration.
//!
//! One immutable record per trial, grouped by stage.  Rates are probabilities
//! in `[0, 1]`, durations are staff minutes (sampled around the configured
//! mean with `simulation.duration_spread`), capacities are weekly slot counts
//! and target waits are weeks.
//!
//! Defaults reproduce the reference service model: 60 referrals per week,
//! 48 triage / 25 MDT / 62 assessment slots per week, a 52-week horizon and
//! ten runs.  With the `serde` feature every section is `#[serde(default)]`,
//! so a JSON file only needs the fields it changes.

use crate::{DpError, DpResult, QueueStage};

// ── Per-stage sections ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ReferralConfig {
    /// Mean referrals per week (Poisson λ).
    pub arrival_rate:   f64,
    pub rejection_rate: f64,
    pub screening_mins: f64,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self { arrival_rate: 60.0, rejection_rate: 0.05, screening_mins: 15.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct TriageConfig {
    pub rejection_rate:              f64,
    pub weekly_capacity:             u32,
    pub clinical_mins:               f64,
    pub admin_mins:                  f64,
    pub discharge_notification_mins: f64,
    pub target_wait:                 f64,
    /// Weeks added to the recorded queue wait of triage-backlog patients.
    pub backlog_wait_offset:         f64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            rejection_rate:              0.05,
            weekly_capacity:             48,
            clinical_mins:               75.0,
            admin_mins:                  60.0,
            discharge_notification_mins: 20.0,
            target_wait:                 4.0,
            backlog_wait_offset:         0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct PackConfig {
    pub rejection_rate:              f64,
    pub admin_send_mins:             f64,
    pub rejection_notification_mins: f64,
    pub target_wait:                 f64,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            rejection_rate:              0.03,
            admin_send_mins:             30.0,
            rejection_notification_mins: 20.0,
            target_wait:                 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ObservationsConfig {
    pub rejection_rate:              f64,
    pub visit_mins:                  f64,
    pub rejection_notification_mins: f64,
    pub target_wait:                 f64,
}

impl Default for ObservationsConfig {
    fn default() -> Self {
        Self {
            rejection_rate:              0.02,
            visit_mins:                  120.0,
            rejection_notification_mins: 20.0,
            target_wait:                 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct MdtConfig {
    pub rejection_rate:              f64,
    pub weekly_capacity:             u32,
    pub prep_mins:                   f64,
    pub meeting_mins:                f64,
    pub rejection_notification_mins: f64,
    pub target_wait:                 f64,
}

impl Default for MdtConfig {
    fn default() -> Self {
        Self {
            rejection_rate:              0.05,
            weekly_capacity:             25,
            prep_mins:                   30.0,
            meeting_mins:                30.0,
            rejection_notification_mins: 20.0,
            target_wait:                 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct AssessmentConfig {
    pub rejection_rate:      f64,
    pub weekly_capacity:     u32,
    pub clinical_mins:       f64,
    pub admin_mins:          f64,
    pub target_wait:         f64,
    /// Weeks added to the recorded queue wait of assessment-backlog patients.
    pub backlog_wait_offset: f64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            rejection_rate:      0.01,
            weekly_capacity:     62,
            clinical_mins:       90.0,
            admin_mins:          60.0,
            target_wait:         4.0,
            backlog_wait_offset: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct DiagnosisConfig {
    pub accepted_notification_mins: f64,
    pub rejected_notification_mins: f64,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self { accepted_notification_mins: 30.0, rejected_notification_mins: 30.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct SimulationConfig {
    /// Weeks to simulate.  A run records `horizon_weeks + 1` weekly rows.
    pub horizon_weeks:           u32,
    pub number_of_runs:          u32,
    /// Standard deviation (minutes) for every sampled activity duration.
    pub duration_spread:         f64,
    /// Patients already waiting for triage when the run starts.
    pub triage_waiting_list:     u32,
    /// Patients already waiting for assessment when the run starts.
    pub assessment_waiting_list: u32,
    /// Master seed for a trial.  The same seed always produces identical results.
    pub seed:                    u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_weeks:           52,
            number_of_runs:          10,
            duration_spread:         10.0,
            triage_waiting_list:     0,
            assessment_waiting_list: 0,
            seed:                    42,
        }
    }
}

impl SimulationConfig {
    #[inline]
    pub fn has_backlog(&self) -> bool {
        self.triage_waiting_list > 0 || self.assessment_waiting_list > 0
    }
}

// ── PathwayConfig ─────────────────────────────────────────────────────────────

/// Every parameter a run reads.  Pass by reference; never mutated mid-run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct PathwayConfig {
    pub referral:     ReferralConfig,
    pub triage:       TriageConfig,
    pub pack:         PackConfig,
    pub observations: ObservationsConfig,
    pub mdt:          MdtConfig,
    pub assessment:   AssessmentConfig,
    pub diagnosis:    DiagnosisConfig,
    pub simulation:   SimulationConfig,
}

impl PathwayConfig {
    /// Weekly slot count of a gated stage.
    pub fn capacity(&self, stage: QueueStage) -> u32 {
        match stage {
            QueueStage::Triage => self.triage.weekly_capacity,
            QueueStage::Mdt => self.mdt.weekly_capacity,
            QueueStage::Assessment => self.assessment.weekly_capacity,
        }
    }

    /// Target queue wait (weeks) of a gated stage.
    pub fn target_wait(&self, stage: QueueStage) -> f64 {
        match stage {
            QueueStage::Triage => self.triage.target_wait,
            QueueStage::Mdt => self.mdt.target_wait,
            QueueStage::Assessment => self.assessment.target_wait,
        }
    }

    /// Initial backlog size of a gated stage.  MDT never has one.
    pub fn backlog(&self, stage: QueueStage) -> u32 {
        match stage {
            QueueStage::Triage => self.simulation.triage_waiting_list,
            QueueStage::Mdt => 0,
            QueueStage::Assessment => self.simulation.assessment_waiting_list,
        }
    }

    /// Whether any patient can ever request a unit from `stage`'s pool,
    /// given whether the run's referral source can produce referrals.
    pub fn reachable(&self, stage: QueueStage, refers: bool) -> bool {
        let triage = refers || self.simulation.triage_waiting_list > 0;
        match stage {
            QueueStage::Triage | QueueStage::Mdt => triage,
            QueueStage::Assessment => triage || self.simulation.assessment_waiting_list > 0,
        }
    }

    /// Reject any configuration a run could not execute to completion,
    /// assuming Poisson referrals at `referral.arrival_rate`.
    pub fn validate(&self) -> DpResult<()> {
        self.validate_with(self.referral.arrival_rate > 0.0)
    }

    /// As [`validate`](Self::validate), for a run whose referral source
    /// `refers` (can produce at least one referral).
    ///
    /// A zero-capacity pool is only an error when some patient can reach it;
    /// otherwise nobody would ever block on it.
    pub fn validate_with(&self, refers: bool) -> DpResult<()> {
        let rates = [
            ("referral.rejection_rate", self.referral.rejection_rate),
            ("triage.rejection_rate", self.triage.rejection_rate),
            ("pack.rejection_rate", self.pack.rejection_rate),
            ("observations.rejection_rate", self.observations.rejection_rate),
            ("mdt.rejection_rate", self.mdt.rejection_rate),
            ("assessment.rejection_rate", self.assessment.rejection_rate),
        ];
        for (name, p) in rates {
            if !(0.0..=1.0).contains(&p) {
                return Err(DpError::Config(format!("{name} must be in [0, 1], got {p}")));
            }
        }

        let lambda = self.referral.arrival_rate;
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(DpError::Config(format!(
                "referral.arrival_rate must be finite and >= 0, got {lambda}"
            )));
        }

        let durations = [
            ("referral.screening_mins", self.referral.screening_mins),
            ("triage.clinical_mins", self.triage.clinical_mins),
            ("triage.admin_mins", self.triage.admin_mins),
            ("triage.discharge_notification_mins", self.triage.discharge_notification_mins),
            ("pack.admin_send_mins", self.pack.admin_send_mins),
            ("pack.rejection_notification_mins", self.pack.rejection_notification_mins),
            ("observations.visit_mins", self.observations.visit_mins),
            ("observations.rejection_notification_mins", self.observations.rejection_notification_mins),
            ("mdt.prep_mins", self.mdt.prep_mins),
            ("mdt.meeting_mins", self.mdt.meeting_mins),
            ("mdt.rejection_notification_mins", self.mdt.rejection_notification_mins),
            ("assessment.clinical_mins", self.assessment.clinical_mins),
            ("assessment.admin_mins", self.assessment.admin_mins),
            ("diagnosis.accepted_notification_mins", self.diagnosis.accepted_notification_mins),
            ("diagnosis.rejected_notification_mins", self.diagnosis.rejected_notification_mins),
        ];
        for (name, mins) in durations {
            if !mins.is_finite() || mins <= 0.0 {
                return Err(DpError::Config(format!("{name} must be a positive duration, got {mins}")));
            }
        }

        let non_negative = [
            ("simulation.duration_spread", self.simulation.duration_spread),
            ("triage.target_wait", self.triage.target_wait),
            ("pack.target_wait", self.pack.target_wait),
            ("observations.target_wait", self.observations.target_wait),
            ("mdt.target_wait", self.mdt.target_wait),
            ("assessment.target_wait", self.assessment.target_wait),
            ("triage.backlog_wait_offset", self.triage.backlog_wait_offset),
            ("assessment.backlog_wait_offset", self.assessment.backlog_wait_offset),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(DpError::Config(format!("{name} must be finite and >= 0, got {v}")));
            }
        }

        if self.simulation.horizon_weeks == 0 {
            return Err(DpError::Config("simulation.horizon_weeks must be at least 1".into()));
        }
        if self.simulation.number_of_runs == 0 {
            return Err(DpError::Config("simulation.number_of_runs must be at least 1".into()));
        }

        for stage in QueueStage::ALL {
            if self.capacity(stage) == 0 && self.reachable(stage, refers) {
                return Err(DpError::Config(format!(
                    "{stage}.weekly_capacity is 0 but patients can reach {stage}; \
                     they would wait forever"
                )));
            }
        }

        Ok(())
    }
}
