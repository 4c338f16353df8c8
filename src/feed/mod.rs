//! Batch feeding for calibration engines.
//!
//! [`CalibrationFeeder`] implements the pull-based [`BatchSource`] protocol:
//! the engine repeatedly asks for the next batch by input name, the feeder
//! reconciles recorded samples to the configured target shapes, writes them
//! into cached device buffers, and signals exhaustion with `Ok(None)`.

mod feeder;
mod types;


pub use feeder::{BatchSource, CalibrationFeeder};
pub use types::{
    CachePolicy, CalibrationAlgorithm, FeederOptions, ShapeSpec, DEFAULT_MODEL_TYPE,
};
