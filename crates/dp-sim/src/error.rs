use dp_core::DpError;
use dp_pathway::PathwayError;
use dp_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] DpError),

    #[error("referral source error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("pathway error: {0}")]
    Pathway(#[from] PathwayError),

    #[error("run already simulated its full horizon of {0} weeks")]
    HorizonReached(u32),

    #[error("prefill must run before week 0; next week is {0}")]
    PrefillAfterStart(u32),

    #[error("prefill already ran for this run")]
    AlreadyPrefilled,
}

pub type SimResult<T> = Result<T, SimError>;
