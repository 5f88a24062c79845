//! Host-memory `BufferTransfer` backend.
//!
//! All copies are synchronous memcpys, so `synchronize` is a no-op.
//! Any buffer tagged as device-resident is out of this backend's reach
//! and reported as `UnsupportedDevice`.

use sieve_common::buffer::{BufferStorage, FrameBuffer, Ownership};
use sieve_common::error::TransferError;
use sieve_common::ports::BufferTransfer;
use sieve_common::types::{DeviceHandle, DeviceType};

/// Synchronous host-memory transfer backend.
#[derive(Clone, Debug, Default)]
pub struct HostTransfer;

impl HostTransfer {
    pub fn new() -> Self {
        Self
    }
}

impl BufferTransfer for HostTransfer {
    fn allocate(&self, device: DeviceHandle, size: usize) -> Result<FrameBuffer, TransferError> {
        if !device.is_cpu() {
            return Err(TransferError::UnsupportedDevice {
                device: device.device_type,
            });
        }
        // try_reserve_exact keeps allocation failure a reportable error
        // instead of an abort.
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| TransferError::AllocFailed { size })?;
        data.resize(size, 0);
        Ok(FrameBuffer {
            device,
            size,
            ownership: Ownership::Owned,
            storage: BufferStorage::Host(data),
        })
    }

    fn copy(
        &self,
        dst: &mut FrameBuffer,
        src: &FrameBuffer,
        size: usize,
    ) -> Result<(), TransferError> {
        let src_bytes = src.as_host().ok_or(TransferError::UnsupportedDevice {
            device: src.device.device_type,
        })?;
        let dst_device = dst.device.device_type;
        let dst_bytes = dst.as_host_mut().ok_or(TransferError::UnsupportedDevice {
            device: dst_device,
        })?;
        if size > dst_bytes.len() || size > src_bytes.len() {
            return Err(TransferError::SizeMismatch {
                requested: size,
                dst: dst_bytes.len(),
                src: src_bytes.len(),
            });
        }
        dst_bytes[..size].copy_from_slice(&src_bytes[..size]);
        Ok(())
    }

    fn free(&self, buffer: FrameBuffer) {
        // Host storage is inline; dropping the handle releases it.
        drop(buffer);
    }

    fn synchronize(&self) -> Result<(), TransferError> {
        Ok(())
    }
}
