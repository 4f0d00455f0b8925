use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("referral distribution error: {0}")]
    Distribution(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
