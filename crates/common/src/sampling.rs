//! Sampling descriptors and their binary wire codec.
//!
//! A `SampleArgs` is the declarative per-chunk descriptor produced
//! upstream: which absolute frame indices to retain, how many leading
//! warmup indices to skip once the engine is warm, and the absolute
//! index of the first packet fed this call. On the wire it is a small
//! little-endian layout:
//!
//! ```text
//! [tag u8] [warmup_count i32] [start_keyframe i32] [mode payload]
//!   tag 0  All:            start i32, end i32
//!   tag 1  Strided:        start i32, end i32, stride i32
//!   tag 2  Gather:         count u32, count * point i32
//!   tag 3  SequenceGather: count u32, count * (start i32, end i32)
//! ```

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{ContractViolation, EvalError, WireError};

/// Half-open frame index interval `[start, end)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: i32,
    pub end: i32,
}

impl Interval {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }
}

/// Which frames of the chunk to retain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingMode {
    /// Every index in the interval.
    All { interval: Interval },
    /// Every `stride`-th index in the interval.
    Strided { interval: Interval, stride: i32 },
    /// An explicit, strictly increasing index list.
    Gather { points: Vec<i32> },
    /// A gathered interval; exactly one interval is a hard invariant.
    SequenceGather { sequences: Vec<Interval> },
}

/// One chunk's sampling descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleArgs {
    pub mode: SamplingMode,
    /// Leading indices to skip when the engine is already warm.
    pub warmup_count: i32,
    /// Absolute frame index of the first packet fed this call.
    pub start_keyframe: i32,
}

const TAG_ALL: u8 = 0;
const TAG_STRIDED: u8 = 1;
const TAG_GATHER: u8 = 2;
const TAG_SEQUENCE_GATHER: u8 = 3;

/// Serialize a descriptor to its wire form.
pub fn encode_sample_args(args: &SampleArgs) -> Vec<u8> {
    let mut out = Vec::with_capacity(32);
    let tag = match args.mode {
        SamplingMode::All { .. } => TAG_ALL,
        SamplingMode::Strided { .. } => TAG_STRIDED,
        SamplingMode::Gather { .. } => TAG_GATHER,
        SamplingMode::SequenceGather { .. } => TAG_SEQUENCE_GATHER,
    };
    out.push(tag);
    // Vec<u8> writes are infallible.
    out.write_i32::<LittleEndian>(args.warmup_count).unwrap();
    out.write_i32::<LittleEndian>(args.start_keyframe).unwrap();
    match &args.mode {
        SamplingMode::All { interval } => {
            out.write_i32::<LittleEndian>(interval.start).unwrap();
            out.write_i32::<LittleEndian>(interval.end).unwrap();
        }
        SamplingMode::Strided { interval, stride } => {
            out.write_i32::<LittleEndian>(interval.start).unwrap();
            out.write_i32::<LittleEndian>(interval.end).unwrap();
            out.write_i32::<LittleEndian>(*stride).unwrap();
        }
        SamplingMode::Gather { points } => {
            out.write_u32::<LittleEndian>(points.len() as u32).unwrap();
            for p in points {
                out.write_i32::<LittleEndian>(*p).unwrap();
            }
        }
        SamplingMode::SequenceGather { sequences } => {
            out.write_u32::<LittleEndian>(sequences.len() as u32).unwrap();
            for seq in sequences {
                out.write_i32::<LittleEndian>(seq.start).unwrap();
                out.write_i32::<LittleEndian>(seq.end).unwrap();
            }
        }
    }
    out
}

/// Bounds-checked little-endian reader over a descriptor buffer.
struct ArgsReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ArgsReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let end = self.offset.checked_add(len).ok_or(WireError::TruncatedArgs {
            needed: len,
            got: self.buf.len() - self.offset,
        })?;
        if end > self.buf.len() {
            return Err(WireError::TruncatedArgs {
                needed: len,
                got: self.buf.len() - self.offset,
            });
        }
        let slice = &self.buf[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn read_i32(&mut self) -> Result<i32, WireError> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }
}

/// Deserialize a descriptor from its wire form.
///
/// An unrecognized tag is a [`ContractViolation`] — the engine cannot
/// proceed without a sampling policy; truncation is a [`WireError`].
pub fn decode_sample_args(buf: &[u8]) -> Result<SampleArgs, EvalError> {
    let mut rd = ArgsReader::new(buf);
    let tag = rd.read_u8().map_err(EvalError::Wire)?;
    let warmup_count = rd.read_i32().map_err(EvalError::Wire)?;
    let start_keyframe = rd.read_i32().map_err(EvalError::Wire)?;

    let mode = match tag {
        TAG_ALL => SamplingMode::All {
            interval: Interval::new(rd.read_i32()?, rd.read_i32()?),
        },
        TAG_STRIDED => SamplingMode::Strided {
            interval: Interval::new(rd.read_i32()?, rd.read_i32()?),
            stride: rd.read_i32()?,
        },
        TAG_GATHER => {
            let count = rd.read_u32()? as usize;
            let mut points = Vec::with_capacity(count.min(4096));
            for _ in 0..count {
                points.push(rd.read_i32()?);
            }
            SamplingMode::Gather { points }
        }
        TAG_SEQUENCE_GATHER => {
            let count = rd.read_u32()? as usize;
            let mut sequences = Vec::with_capacity(count.min(4096));
            for _ in 0..count {
                sequences.push(Interval::new(rd.read_i32()?, rd.read_i32()?));
            }
            SamplingMode::SequenceGather { sequences }
        }
        tag => return Err(ContractViolation::UnknownSamplingMode { tag }.into()),
    };

    Ok(SampleArgs {
        mode,
        warmup_count,
        start_keyframe,
    })
}
