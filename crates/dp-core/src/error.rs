//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `DpError` as one variant
//! via `#[from]`.

use thiserror::Error;

use crate::PatientId;

/// The top-level error type for `dp-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum DpError {
    #[error("patient {0} not found")]
    PatientNotFound(PatientId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `dp-core`.
pub type DpResult<T> = Result<T, DpError>;
