//! Admission error types.

use thiserror::Error;

/// Contract violations in a dispatch request.
///
/// Capacity conditions never surface as errors — they are reported through
/// the `Permit` result shape. An `AdmissionError` means the caller built a
/// request that can never be evaluated, which is a property of caller
/// correctness rather than system load.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The request violates the calling contract.
    #[error("invalid dispatch request: {0}")]
    InvalidRequest(String),
}
