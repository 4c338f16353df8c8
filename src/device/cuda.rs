//! CUDA arena backed by trueno-gpu.
//!
//! Buffers live in device memory; the address handed to the engine is the
//! raw device pointer. Requires the `cuda` feature and a working CUDA driver.

use std::sync::Arc;

use trueno_gpu::driver::{cuda_available, CudaContext, GpuBuffer};

use super::arena::{DeviceArena, DeviceBuffer, DeviceError, Result};

/// Arena bound to one CUDA device.
pub struct CudaArena {
    ctx: Arc<CudaContext>,
}

impl CudaArena {
    /// Open the given CUDA device.
    pub fn new(device_id: i32) -> Result<Self> {
        if !cuda_available() {
            return Err(DeviceError::CudaNotAvailable("No CUDA driver found".into()));
        }
        let ctx = CudaContext::new(device_id)
            .map_err(|e| DeviceError::CudaNotAvailable(format!("{e:?}")))?;
        Ok(Self { ctx: Arc::new(ctx) })
    }

    /// Open device 0.
    pub fn default_device() -> Result<Self> {
        Self::new(0)
    }
}

impl DeviceArena for CudaArena {
    type Buffer = CudaBuffer;

    fn allocate(&self, len: usize) -> Result<CudaBuffer> {
        let zeros = vec![0.0f32; len];
        let buf = GpuBuffer::from_host(&self.ctx, &zeros)
            .map_err(|e| DeviceError::AllocationFailed(format!("{e:?}")))?;
        Ok(CudaBuffer { buf, len })
    }
}

/// GPU-resident buffer.
pub struct CudaBuffer {
    buf: GpuBuffer<f32>,
    len: usize,
}

impl DeviceBuffer for CudaBuffer {
    fn write(&mut self, host: &[f32]) -> Result<()> {
        if host.len() != self.len {
            return Err(DeviceError::LengthMismatch {
                expected: self.len,
                actual: host.len(),
            });
        }
        self.buf
            .copy_from_host(host)
            .map_err(|e| DeviceError::TransferFailed(format!("{e:?}")))
    }

    fn read(&self, out: &mut [f32]) -> Result<()> {
        if out.len() != self.len {
            return Err(DeviceError::LengthMismatch {
                expected: self.len,
                actual: out.len(),
            });
        }
        self.buf
            .copy_to_host(out)
            .map_err(|e| DeviceError::TransferFailed(format!("{e:?}")))
    }

    fn len(&self) -> usize {
        self.len
    }

    fn address(&self) -> u64 {
        self.buf.as_ptr() as u64
    }
}
