//! Host-memory arena.
//!
//! Serves CPU-side calibration engines and tests. Buffers are boxed slices,
//! so the address reported to the engine is the allocation's pointer and
//! never moves while the buffer lives.

use super::arena::{DeviceArena, DeviceBuffer, Result};

/// Arena handing out host-resident buffers.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostArena;

impl HostArena {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceArena for HostArena {
    type Buffer = HostBuffer;

    fn allocate(&self, len: usize) -> Result<HostBuffer> {
        Ok(HostBuffer {
            data: vec![0.0f32; len].into_boxed_slice(),
        })
    }
}

/// Host-resident buffer with a pointer-stable address.
#[derive(Debug)]
pub struct HostBuffer {
    data: Box<[f32]>,
}

impl HostBuffer {
    /// Read-only view of the buffer contents.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl DeviceBuffer for HostBuffer {
    fn write(&mut self, host: &[f32]) -> Result<()> {
        check_len(self.data.len(), host.len())?;
        self.data.copy_from_slice(host);
        Ok(())
    }

    fn read(&self, out: &mut [f32]) -> Result<()> {
        check_len(self.data.len(), out.len())?;
        out.copy_from_slice(&self.data);
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn address(&self) -> u64 {
        self.data.as_ptr() as u64
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(super::arena::DeviceError::LengthMismatch { expected, actual });
    }
    Ok(())
}
