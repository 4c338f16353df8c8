//! Crate error types.

use thiserror::Error;

use crate::dataset::StoreError;
use crate::device::DeviceError;
use crate::shape::ReconcileError;

/// Errors surfaced by the calibration feeder.
///
/// Everything here is fatal: there is no retry path and no degraded mode,
/// since calibration correctness requires exact adherence to the batch
/// protocol. Dataset exhaustion is not an error; it is signaled as `Ok(None)`
/// from [`BatchSource::next_batch`](crate::BatchSource::next_batch).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing group {0:?} in calibration store")]
    MissingGroup(String),

    #[error("Group {0:?} holds no samples")]
    EmptyGroup(String),

    #[error("Input {0:?} is not present in the shape table")]
    UnknownInput(String),

    #[error("Invalid target shape for input {input:?}: {detail}")]
    InvalidShape { input: String, detail: String },

    #[error("Invalid recorded sample for input {input:?}: {detail}")]
    InvalidSample { input: String, detail: String },

    #[error("Cannot reconcile input {input:?} to its target shape: {source}")]
    Reconcile {
        input: String,
        source: ReconcileError,
    },

    #[error("Input group {input:?} disagrees with {reference:?}: {detail}")]
    InconsistentGroup {
        input: String,
        reference: String,
        detail: String,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// Result type for feeder operations
pub type Result<T> = std::result::Result<T, Error>;
