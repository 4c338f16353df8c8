//! Calibration-batch feeding for post-training quantization engines.
//!
//! A quantization engine estimates value ranges from representative input
//! batches. `calibrar` is the adapter that feeds it: samples come from a
//! pre-recorded, hierarchically keyed dataset store
//! (`calib_data/<model_type>/<input>/<index>`), get reconciled to the exact
//! target shape the engine demands (tile, then crop), and land in per-input
//! device buffers that are allocated once and overwritten in place on every
//! batch. The engine drives the [`BatchSource`] protocol sequentially until
//! the feeder signals exhaustion with `Ok(None)`.
//!
//! # Example
//!
//! ```
//! use calibrar::dataset::InMemoryStore;
//! use calibrar::device::HostArena;
//! use calibrar::{BatchSource, CalibrationFeeder, FeederOptions, ShapeSpec};
//! use ndarray::{ArrayD, IxDyn};
//!
//! # fn main() -> calibrar::Result<()> {
//! let mut store = InMemoryStore::new();
//! store.record("end2end", "input", ArrayD::zeros(IxDyn(&[1, 3, 8, 8])));
//!
//! let shapes = ShapeSpec::new().with_shape("input", &[1, 3, 16, 16]);
//! let mut feeder =
//!     CalibrationFeeder::new(store, shapes, HostArena::new(), FeederOptions::default())?;
//!
//! while let Some(addresses) = feeder.next_batch(&["input"])? {
//!     // hand the addresses to the engine
//!     assert_eq!(addresses.len(), 1);
//! }
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod device;
pub mod error;
pub mod feed;
pub mod shape;

pub use error::{Error, Result};
pub use feed::{
    BatchSource, CachePolicy, CalibrationAlgorithm, CalibrationFeeder, FeederOptions, ShapeSpec,
    DEFAULT_MODEL_TYPE,
};
