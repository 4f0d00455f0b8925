//! The `PathwayModel` trait: the seam between the run loop and pathway logic.

use dp_core::PatientRng;
use dp_patient::Patient;

use crate::{PathwayResult, StageContext, Suspend};

/// Pluggable patient pathway.
///
/// `advance` executes the state named by `patient.step`, records whatever
/// that state samples, moves `patient.step` on, and tells the run how to
/// suspend.  The run keeps calling it while it returns
/// [`Suspend::Continue`].
///
/// # Contract
///
/// - Deterministic given the same `rng` state and context.
/// - All randomness comes from the patient's own `rng`.
/// - Returns [`Suspend::Await`] only after `patient.step` already names the
///   state to run once the pool unit is granted.
///
/// # Example
///
/// ```rust,ignore
/// struct ScreenOnly;
///
/// impl PathwayModel for ScreenOnly {
///     fn advance(&self, p: &mut Patient, ctx: &mut StageContext<'_>, rng: &mut PatientRng)
///         -> PathwayResult<Suspend>
///     {
///         p.outcome = Some(Outcome::Rejected(Stage::Referral));
///         p.step = Step::Done;
///         Ok(Suspend::Done)
///     }
/// }
/// ```
pub trait PathwayModel: Send + Sync + 'static {
    fn advance(
        &self,
        patient: &mut Patient,
        ctx:     &mut StageContext<'_>,
        rng:     &mut PatientRng,
    ) -> PathwayResult<Suspend>;
}
