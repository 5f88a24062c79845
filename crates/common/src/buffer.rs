//! Ownership-tagged buffer handles that cross device boundaries.
//!
//! A `FrameBuffer` replaces the raw owning pointers of a classic C decode
//! pipeline: every buffer carries its device, its size, and whether the
//! holder owns it. Host buffers carry their bytes inline; device buffers
//! carry an opaque backend handle, resolved only by the owning
//! [`BufferTransfer`](crate::ports::BufferTransfer) backend.

use crate::types::DeviceHandle;

/// Whether the holder of a `FrameBuffer` owns its storage.
///
/// Caller-owned inputs are `Borrowed` — the engine may read (and stage)
/// them but must not free them. Engine-allocated outputs are `Owned`
/// until they are handed to the output channel, at which point ownership
/// transfers to the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Borrowed,
}

/// Backing storage of a `FrameBuffer`.
#[derive(Clone, Debug)]
pub enum BufferStorage {
    /// Host memory, bytes held inline.
    Host(Vec<u8>),
    /// Accelerator memory, opaque handle owned by the transfer backend.
    Device { handle: u64 },
}

/// A byte buffer bound to a specific device.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pub device: DeviceHandle,
    pub size: usize,
    pub ownership: Ownership,
    pub storage: BufferStorage,
}

impl FrameBuffer {
    /// Wrap caller-provided host bytes as a borrowed input buffer.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let size = data.len();
        Self {
            device: DeviceHandle::CPU,
            size,
            ownership: Ownership::Borrowed,
            storage: BufferStorage::Host(data),
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self.storage, BufferStorage::Host(_))
    }

    /// Host bytes, if this buffer lives in host memory.
    pub fn as_host(&self) -> Option<&[u8]> {
        match &self.storage {
            BufferStorage::Host(data) => Some(data),
            BufferStorage::Device { .. } => None,
        }
    }

    /// Mutable host bytes, if this buffer lives in host memory.
    pub fn as_host_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.storage {
            BufferStorage::Host(data) => Some(data),
            BufferStorage::Device { .. } => None,
        }
    }
}

/// One pipeline channel: a column of buffers, one entry per work item.
pub type Channel = Vec<FrameBuffer>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeviceType;

    #[test]
    fn from_bytes_is_borrowed_host() {
        let buf = FrameBuffer::from_bytes(vec![1, 2, 3]);
        assert_eq!(buf.size, 3);
        assert_eq!(buf.ownership, Ownership::Borrowed);
        assert!(buf.is_host());
        assert_eq!(buf.as_host(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn device_buffer_has_no_host_view() {
        let buf = FrameBuffer {
            device: DeviceHandle::gpu(0),
            size: 16,
            ownership: Ownership::Owned,
            storage: BufferStorage::Device { handle: 7 },
        };
        assert_eq!(buf.device.device_type, DeviceType::Gpu);
        assert!(buf.as_host().is_none());
        assert!(!buf.is_host());
    }
}
