//! Scoped host staging of device-resident input buffers.
//!
//! Sampling descriptors and packet buffers may arrive in accelerator
//! memory. Deserialization and the packet walk happen on the host, so
//! such inputs are first copied into a host staging buffer. The staging
//! buffer is owned by a [`StagingGuard`] and freed on every exit path,
//! including the fatal-error paths, via `Drop`.

use std::sync::Arc;

use sieve_common::buffer::FrameBuffer;
use sieve_common::error::TransferError;
use sieve_common::ports::BufferTransfer;
use sieve_common::types::DeviceHandle;

/// An owned host staging copy, freed on drop.
pub struct StagingGuard {
    transfer: Arc<dyn BufferTransfer>,
    buffer: Option<FrameBuffer>,
}

impl StagingGuard {
    /// Stage `src` into a fresh host buffer. The copy is awaited before
    /// this returns; the staged bytes are immediately readable.
    pub fn stage(
        transfer: &Arc<dyn BufferTransfer>,
        src: &FrameBuffer,
    ) -> Result<Self, TransferError> {
        let mut host = transfer.allocate(DeviceHandle::CPU, src.size)?;
        transfer.copy(&mut host, src, src.size)?;
        transfer.synchronize()?;
        Ok(Self {
            transfer: Arc::clone(transfer),
            buffer: Some(host),
        })
    }

    /// The staged host bytes.
    pub fn bytes(&self) -> &[u8] {
        self.buffer
            .as_ref()
            .and_then(FrameBuffer::as_host)
            .expect("staging buffer is host-resident by construction")
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.transfer.free(buffer);
        }
    }
}

/// A host view of an input buffer: borrowed directly when it already
/// lives in host memory, staged through a scoped copy otherwise.
pub enum HostBytes<'a> {
    Borrowed(&'a [u8]),
    Staged(StagingGuard),
}

impl HostBytes<'_> {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            HostBytes::Borrowed(bytes) => bytes,
            HostBytes::Staged(guard) => guard.bytes(),
        }
    }
}

/// Resolve an input buffer to host bytes, staging if device-resident.
pub fn resolve_host<'a>(
    buffer: &'a FrameBuffer,
    transfer: &Arc<dyn BufferTransfer>,
) -> Result<HostBytes<'a>, TransferError> {
    match buffer.as_host() {
        Some(bytes) => Ok(HostBytes::Borrowed(bytes)),
        None => Ok(HostBytes::Staged(StagingGuard::stage(transfer, buffer)?)),
    }
}
