//! The diagnostic pathway: referral screening through to diagnosis.
//!
//! Each stage is a state with two exits.  A rejection sets the outcome,
//! records the notification and sends the patient to `Step::Notify`, so no
//! later stage ever samples or records anything for it.
//!
//! Rejection draws compare a fresh `U(0, 1)` against the stage rate.  Referral,
//! triage, MDT and assessment reject on `u <= rate`; pack and observations on
//! `u < rate`.

use dp_core::{PatientRng, QueueStage, SimTime, Stage};
use dp_patient::{Origin, Outcome, Patient, Step};
use tracing::trace;

use crate::{PathwayError, PathwayModel, PathwayResult, StageContext, Suspend, Work};

/// The standard referral → triage → pack → observations → MDT → assessment pathway.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiagnosticPathway;

impl PathwayModel for DiagnosticPathway {
    fn advance(
        &self,
        patient: &mut Patient,
        ctx:     &mut StageContext<'_>,
        rng:     &mut PatientRng,
    ) -> PathwayResult<Suspend> {
        let config = ctx.config;
        let suspend = match patient.step {
            Step::Screening => {
                if rng.chance() <= config.referral.rejection_rate {
                    patient.outcome = Some(Outcome::Rejected(Stage::Referral));
                    ctx.state.reject(Stage::Referral);
                    patient.step = Step::Done;
                    return Ok(Suspend::Done);
                }
                let mins = ctx.minutes(rng, config.referral.screening_mins);
                patient.referral.screening_mins = mins;
                ctx.state.record(Stage::Referral, Work::Admin, mins);
                patient.step = Step::JoinTriage;
                Suspend::hold_minutes(mins)
            }

            Step::JoinTriage => join(patient, ctx, QueueStage::Triage, Step::Triage),

            Step::Triage => {
                let offset = backlog_offset(patient, Origin::TriageBacklog, config.triage.backlog_wait_offset);
                admit(patient, ctx, QueueStage::Triage, offset)?;
                patient.triage.queue.transit = rng.transit(0.0, 4.0);
                let clinical = ctx.minutes(rng, config.triage.clinical_mins);
                let admin = ctx.minutes(rng, config.triage.admin_mins);
                patient.triage.clinical_mins = clinical;
                patient.triage.admin_mins = admin;
                ctx.state.record(Stage::Triage, Work::Clinical, clinical);
                ctx.state.record(Stage::Triage, Work::Admin, admin);

                if rng.chance() <= config.triage.rejection_rate {
                    let notify = ctx.minutes(rng, config.triage.discharge_notification_mins);
                    patient.triage.notification_mins = notify;
                    reject(patient, ctx, Stage::Triage, notify);
                    Suspend::hold_minutes(clinical + admin + notify)
                } else {
                    patient.step = Step::Pack;
                    Suspend::hold_minutes(clinical + admin)
                }
            }

            Step::Pack => {
                let mins = ctx.minutes(rng, config.pack.admin_send_mins);
                patient.pack.admin_mins = mins;
                ctx.state.record(Stage::Pack, Work::Admin, mins);
                patient.step = Step::PackReturn;
                Suspend::hold_minutes(mins)
            }

            Step::PackReturn => {
                if rng.chance() < config.pack.rejection_rate {
                    patient.pack.return_time = rng.transit(3.0, 5.0);
                    let notify = ctx.minutes(rng, config.pack.rejection_notification_mins);
                    patient.pack.notification_mins = notify;
                    reject(patient, ctx, Stage::Pack, notify);
                    Suspend::hold_minutes(notify)
                } else {
                    patient.pack.return_time = rng.transit(0.0, 3.0);
                    patient.step = Step::Observations;
                    Suspend::Continue
                }
            }

            Step::Observations => {
                let mins = ctx.minutes(rng, config.observations.visit_mins);
                patient.observations.visit_mins = mins;
                ctx.state.record(Stage::Observations, Work::Clinical, mins);
                patient.step = Step::ObservationsReturn;
                Suspend::hold_minutes(mins)
            }

            Step::ObservationsReturn => {
                if rng.chance() < config.observations.rejection_rate {
                    patient.observations.return_time = rng.transit(4.0, 6.0);
                    let notify = ctx.minutes(rng, config.observations.rejection_notification_mins);
                    patient.observations.notification_mins = notify;
                    reject(patient, ctx, Stage::Observations, notify);
                    Suspend::hold_minutes(notify)
                } else {
                    patient.observations.return_time = rng.transit(0.0, 4.0);
                    patient.step = Step::MdtPrep;
                    Suspend::Continue
                }
            }

            Step::MdtPrep => {
                let prep = ctx.minutes(rng, config.mdt.prep_mins);
                let meeting = ctx.minutes(rng, config.mdt.meeting_mins);
                patient.mdt.prep_mins = prep;
                patient.mdt.meeting_mins = meeting;
                ctx.state.record(Stage::Mdt, Work::Admin, prep);
                ctx.state.record(Stage::Mdt, Work::Clinical, meeting);
                patient.step = Step::JoinMdt;
                Suspend::hold_minutes(prep + meeting)
            }

            Step::JoinMdt => join(patient, ctx, QueueStage::Mdt, Step::Mdt),

            Step::Mdt => {
                admit(patient, ctx, QueueStage::Mdt, 0.0)?;
                patient.mdt.queue.transit = rng.transit(0.0, 1.0);
                if rng.chance() <= config.mdt.rejection_rate {
                    let notify = ctx.minutes(rng, config.mdt.rejection_notification_mins);
                    patient.mdt.notification_mins = notify;
                    reject(patient, ctx, Stage::Mdt, notify);
                    Suspend::hold_minutes(notify)
                } else {
                    patient.step = Step::JoinAssessment;
                    Suspend::Continue
                }
            }

            Step::JoinAssessment => join(patient, ctx, QueueStage::Assessment, Step::Assessment),

            Step::Assessment => {
                let offset = backlog_offset(
                    patient,
                    Origin::AssessmentBacklog,
                    config.assessment.backlog_wait_offset,
                );
                admit(patient, ctx, QueueStage::Assessment, offset)?;
                patient.assessment.queue.transit = rng.transit(0.0, 4.0);
                let clinical = ctx.minutes(rng, config.assessment.clinical_mins);
                let admin = ctx.minutes(rng, config.assessment.admin_mins);
                patient.assessment.clinical_mins = clinical;
                patient.assessment.admin_mins = admin;
                ctx.state.record(Stage::Assessment, Work::Clinical, clinical);
                ctx.state.record(Stage::Assessment, Work::Admin, admin);

                let notify = if rng.chance() <= config.assessment.rejection_rate {
                    let notify = ctx.minutes(rng, config.diagnosis.rejected_notification_mins);
                    reject(patient, ctx, Stage::Assessment, notify);
                    notify
                } else {
                    let notify = ctx.minutes(rng, config.diagnosis.accepted_notification_mins);
                    patient.outcome = Some(Outcome::Accepted);
                    ctx.state.accept();
                    ctx.state.record(Stage::Assessment, Work::Notification, notify);
                    patient.step = Step::Notify;
                    notify
                };
                patient.diagnosis.notification_mins = notify;
                Suspend::hold_minutes(clinical + admin + notify)
            }

            Step::Notify => {
                patient.step = Step::Done;
                Suspend::Done
            }

            Step::Done => return Err(PathwayError::AlreadyFinished(patient.id)),
        };
        Ok(suspend)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Join `queue`'s waiting list, then request a unit; `next` runs once granted.
fn join(patient: &mut Patient, ctx: &mut StageContext<'_>, queue: QueueStage, next: Step) -> Suspend {
    let record = patient.queue_mut(queue);
    record.wl_position = ctx.state.join(queue);
    record.joined_at = ctx.now.weeks();
    patient.step = next;
    Suspend::Await(queue)
}

/// Leave `queue`'s waiting list on admission and record the wait.
fn admit(
    patient: &mut Patient,
    ctx:     &mut StageContext<'_>,
    queue:   QueueStage,
    offset:  f64,
) -> PathwayResult<()> {
    let id = patient.id;
    let record = patient.queue_mut(queue);
    let wait = ctx.now.since(SimTime(record.joined_at)) + offset;
    record.queue_wait = wait;
    if !ctx.state.admit(queue, wait, ctx.config.target_wait(queue)) {
        return Err(PathwayError::EmptyWaitingList(id, queue));
    }
    trace!(patient = %id, stage = %queue, now = %ctx.now, wait, "admitted");
    Ok(())
}

/// Set a rejection outcome and route the patient to its final notification.
fn reject(patient: &mut Patient, ctx: &mut StageContext<'_>, stage: Stage, notify_mins: f64) {
    patient.outcome = Some(Outcome::Rejected(stage));
    ctx.state.reject(stage);
    ctx.state.record(stage, Work::Notification, notify_mins);
    patient.step = Step::Notify;
}

#[inline]
fn backlog_offset(patient: &Patient, origin: Origin, offset: f64) -> f64 {
    if patient.origin == origin { offset } else { 0.0 }
}
