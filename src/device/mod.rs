//! Device memory: the buffer arena seam.
//!
//! The feeder treats device memory as an opaque capability: allocate a buffer
//! once per input, copy host data into it, expose a stable address. The
//! [`DeviceArena`]/[`DeviceBuffer`] traits capture exactly that. [`HostArena`]
//! is always available; [`CudaArena`] sits behind the `cuda` feature.

mod arena;
mod host;

#[cfg(feature = "cuda")]
mod cuda;

#[cfg(test)]
mod tests;

pub use arena::{DeviceArena, DeviceBuffer, DeviceError, Result};
pub use host::{HostArena, HostBuffer};

#[cfg(feature = "cuda")]
pub use cuda::{CudaArena, CudaBuffer};
