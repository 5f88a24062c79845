//! Raw-frame host decoder.
//!
//! `RawFrameDecoder` implements [`DecoderPort`] for streams whose packet
//! payloads are already raw frames of `frame_size` bytes (no bitstream
//! decoding). It exists as the host backend and as the reference decoder
//! for exercising the engine loop: it honours the full port contract —
//! in-order feeding, an internal reordering buffer that withholds frames
//! until enough have arrived (or a flush), discontinuity resets, and
//! drain-to-empty between invocations.

use std::collections::VecDeque;

use tracing::debug;

use sieve_common::buffer::FrameBuffer;
use sieve_common::error::DecodeError;
use sieve_common::ports::DecoderPort;
use sieve_common::types::VideoMetadata;

/// Host decoder for raw-frame packet streams.
pub struct RawFrameDecoder {
    /// Bytes per frame; 0 until configured.
    frame_size: usize,
    /// Frames held back to model decoder reordering latency. A frame
    /// becomes available only once `display_delay` newer frames have
    /// been fed, or on flush.
    reorder: VecDeque<Vec<u8>>,
    /// Frames available for `get_frame` / `discard_frame`.
    ready: VecDeque<Vec<u8>>,
    display_delay: usize,
    frames_decoded: u64,
}

impl std::fmt::Debug for RawFrameDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrameDecoder")
            .field("frame_size", &self.frame_size)
            .field("display_delay", &self.display_delay)
            .field("reorder", &self.reorder.len())
            .field("ready", &self.ready.len())
            .field("frames_decoded", &self.frames_decoded)
            .finish()
    }
}

impl RawFrameDecoder {
    /// Create a decoder with no reordering delay (every fed frame is
    /// immediately available).
    pub fn new() -> Self {
        Self::with_display_delay(0)
    }

    /// Create a decoder that withholds up to `display_delay` frames
    /// until newer frames (or a flush) arrive.
    pub fn with_display_delay(display_delay: usize) -> Self {
        Self {
            frame_size: 0,
            reorder: VecDeque::new(),
            ready: VecDeque::new(),
            display_delay,
            frames_decoded: 0,
        }
    }

    /// Total frames this decoder has emitted or discarded.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    fn reset_stream_state(&mut self) {
        let dropped = self.reorder.len() + self.ready.len();
        self.reorder.clear();
        self.ready.clear();
        if dropped > 0 {
            debug!(dropped, "discontinuity reset dropped buffered frames");
        }
    }

    fn promote_ready(&mut self) {
        while self.reorder.len() > self.display_delay {
            // reorder is non-empty here
            let frame = self.reorder.pop_front().expect("just checked");
            self.ready.push_back(frame);
        }
    }
}

impl Default for RawFrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderPort for RawFrameDecoder {
    fn configure(&mut self, metadata: &VideoMetadata) -> Result<(), DecodeError> {
        self.frame_size = metadata.frame_size();
        self.reset_stream_state();
        debug!(frame_size = self.frame_size, "raw decoder configured");
        Ok(())
    }

    fn feed(&mut self, packet: Option<&[u8]>, discontinuity: bool) -> Result<bool, DecodeError> {
        if self.frame_size == 0 {
            return Err(DecodeError::NotConfigured);
        }
        if discontinuity {
            self.reset_stream_state();
        }
        match packet {
            Some(payload) if !payload.is_empty() => {
                if payload.len() != self.frame_size {
                    return Err(DecodeError::FrameSizeMismatch {
                        expected: self.frame_size,
                        got: payload.len(),
                    });
                }
                self.reorder.push_back(payload.to_vec());
                self.promote_ready();
            }
            // Empty packet or None: end-of-stream flush, release the
            // reordering buffer.
            _ => {
                while let Some(frame) = self.reorder.pop_front() {
                    self.ready.push_back(frame);
                }
            }
        }
        Ok(!self.ready.is_empty())
    }

    fn get_frame(&mut self, dest: &mut FrameBuffer) -> Result<bool, DecodeError> {
        let frame_size = self.frame_size;
        let frame = match self.ready.front() {
            Some(frame) => frame,
            None => return Ok(false),
        };
        let dest_device = dest.device.device_type;
        let dest_bytes = dest
            .as_host_mut()
            .ok_or(DecodeError::DestinationNotHost {
                device: dest_device,
            })?;
        if dest_bytes.len() < frame_size {
            // Leave the frame buffered so the caller can retry or discard.
            return Err(DecodeError::DestinationTooSmall {
                needed: frame_size,
                got: dest_bytes.len(),
            });
        }
        dest_bytes[..frame_size].copy_from_slice(frame);
        self.ready.pop_front();
        self.frames_decoded += 1;
        Ok(!self.ready.is_empty())
    }

    fn discard_frame(&mut self) -> Result<bool, DecodeError> {
        match self.ready.pop_front() {
            Some(_) => {
                self.frames_decoded += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn frames_buffered(&self) -> usize {
        self.ready.len()
    }

    fn wait_until_frames_copied(&mut self) -> Result<(), DecodeError> {
        // Host writes are synchronous.
        Ok(())
    }
}
