use thiserror::Error;

use dp_core::{PatientId, QueueStage};

#[derive(Debug, Error)]
pub enum PathwayError {
    #[error("{0} resumed after its journey finished")]
    AlreadyFinished(PatientId),

    #[error("{0} admitted from an empty {1} waiting list")]
    EmptyWaitingList(PatientId, QueueStage),
}

pub type PathwayResult<T> = Result<T, PathwayError>;
