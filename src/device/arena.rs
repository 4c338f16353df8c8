//! The device-memory seam.

use thiserror::Error;

/// Device errors
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    #[error("Data transfer failed: {0}")]
    TransferFailed(String),

    #[error("Buffer length mismatch: buffer holds {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("CUDA not available: {0}")]
    CudaNotAvailable(String),
}

/// Result type for device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Allocation capability for one target device.
///
/// The feeder allocates each per-input buffer exactly once and overwrites it
/// in place on every later batch; arenas only need to hand out fresh buffers.
pub trait DeviceArena {
    type Buffer: DeviceBuffer;

    /// Allocate a zero-initialized buffer of `len` f32 elements.
    fn allocate(&self, len: usize) -> Result<Self::Buffer>;
}

/// A device-resident buffer whose address stays stable for its lifetime.
pub trait DeviceBuffer {
    /// Overwrite the buffer with host data. `host` must match the buffer
    /// length exactly.
    fn write(&mut self, host: &[f32]) -> Result<()>;

    /// Copy the buffer back to host memory. `out` must match the buffer
    /// length exactly.
    fn read(&self, out: &mut [f32]) -> Result<()>;

    /// Element count.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable device address handed to the calibration engine.
    fn address(&self) -> u64;
}
