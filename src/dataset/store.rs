//! The sample-store seam.

use ndarray::ArrayD;
use thiserror::Error;

/// Root group every calibration store must carry.
pub const CALIB_DATA_GROUP: &str = "calib_data";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store has no {CALIB_DATA_GROUP:?} root group")]
    MissingRoot,

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Missing sample {index} for input {input:?}")]
    MissingSample { input: String, index: usize },

    #[error("Unsupported tensor payload: {0}")]
    Unsupported(String),

    #[error("Malformed store file: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Read-only view of a hierarchically keyed calibration dataset.
///
/// Layout: `calib_data / <model_type> / <input_name> / <index>`, one level per
/// key, where each leaf holds one recorded sample tensor whose leading
/// dimension is the batch size. This layout is a compatibility requirement
/// for interoperating with previously recorded calibration datasets.
pub trait SampleStore {
    /// Model-type groups recorded under the `calib_data` root.
    fn model_types(&self) -> Vec<String>;

    /// Input groups recorded for `model_type`, in store iteration order.
    fn input_names(&self, model_type: &str) -> Result<Vec<String>>;

    /// Number of samples recorded for one input group.
    fn sample_count(&self, model_type: &str, input: &str) -> Result<usize>;

    /// Fetch the sample at `index` from one input group.
    fn sample(&self, model_type: &str, input: &str, index: usize) -> Result<ArrayD<f32>>;
}
