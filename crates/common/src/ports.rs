//! Backend abstraction traits.
//!
//! These traits define the seams between the decode engine and its
//! backends. The engine programs against `DecoderPort` and
//! `BufferTransfer`, never against concrete decoder or memory
//! implementations; backends are selected at construction time by
//! declared device capability.

use crate::buffer::FrameBuffer;
use crate::error::{DecodeError, TransferError};
use crate::types::{DeviceHandle, VideoMetadata};

/// Capability-typed interface to a stateful, resumable video decoder.
///
/// The decoder is fed compressed packets strictly in order and buffers
/// some number of frames internally (reordering delay). One `feed` may
/// surface zero or more decoded frames; callers drain them with
/// `get_frame` / `discard_frame` and may probe `frames_buffered` to
/// decide whether more are available right now.
pub trait DecoderPort: Send {
    /// Reconfigure for new stream metadata. Clears any buffered frames.
    fn configure(&mut self, metadata: &VideoMetadata) -> Result<(), DecodeError>;

    /// Feed one compressed packet, or `None` for the end-of-stream flush.
    ///
    /// `discontinuity` tells the decoder the packet is not contiguous
    /// with the previously fed stream position and internal prediction
    /// state must be reset before consuming it.
    ///
    /// Returns true when decoded frames are available after this feed.
    fn feed(&mut self, packet: Option<&[u8]>, discontinuity: bool) -> Result<bool, DecodeError>;

    /// Materialize the oldest available frame into `dest`.
    ///
    /// Returns true when more frames remain available. The write into a
    /// device-resident `dest` may be asynchronous; completion is observed
    /// via [`wait_until_frames_copied`](DecoderPort::wait_until_frames_copied).
    fn get_frame(&mut self, dest: &mut FrameBuffer) -> Result<bool, DecodeError>;

    /// Drop the oldest available frame without materializing it.
    ///
    /// Returns true when a frame was actually discarded.
    fn discard_frame(&mut self) -> Result<bool, DecodeError>;

    /// Number of decoded frames currently available.
    fn frames_buffered(&self) -> usize;

    /// Block until all asynchronous frame copies issued by `get_frame`
    /// have completed.
    fn wait_until_frames_copied(&mut self) -> Result<(), DecodeError>;
}

/// Copies byte buffers between host and accelerator memory and allocates
/// frame-sized output buffers on a requested device.
///
/// Copies may be issued asynchronously; callers must `synchronize` before
/// reclaiming or reusing any source buffer.
pub trait BufferTransfer: Send + Sync + core::fmt::Debug {
    /// Allocate an owned, zeroed buffer of `size` bytes on `device`.
    fn allocate(&self, device: DeviceHandle, size: usize) -> Result<FrameBuffer, TransferError>;

    /// Copy `size` bytes from `src` into `dst`, possibly across devices.
    fn copy(
        &self,
        dst: &mut FrameBuffer,
        src: &FrameBuffer,
        size: usize,
    ) -> Result<(), TransferError>;

    /// Release an owned buffer back to its backend.
    fn free(&self, buffer: FrameBuffer);

    /// Block until all outstanding asynchronous copies have completed.
    fn synchronize(&self) -> Result<(), TransferError>;
}
