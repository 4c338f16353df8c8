//! Calibration dataset stores.
//!
//! A calibration dataset is a hierarchically keyed collection of recorded
//! sample tensors: `calib_data / <model_type> / <input_name> / <index>`. The
//! [`SampleStore`] trait is the read-only seam the feeder consumes; shipped
//! implementations are [`InMemoryStore`] (recording and tests) and
//! [`SafetensorsStore`] (pre-recorded datasets on disk).

mod file;
mod memory;
mod store;


pub use file::{save_samples, SafetensorsStore};
pub use memory::InMemoryStore;
pub use store::{Result, SampleStore, StoreError, CALIB_DATA_GROUP};
