//! Central error types for the engine (thiserror-based).
//!
//! Fatal conditions are modelled as explicit error values instead of
//! assertions so the surrounding pipeline can decide abort-vs-restart
//! policy. A `ContractViolation` means upstream handed the engine an
//! invalid plan (or the decoder broke its feed/get contract) and no
//! recovery is attempted at this layer.

use thiserror::Error;

use crate::types::DeviceType;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Invariant breaks that terminate the invocation with no recovery.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("unknown sampling mode tag {tag}")]
    UnknownSamplingMode { tag: u8 },

    #[error("SequenceGather must carry exactly one interval, got {count}")]
    SequenceGatherArity { count: usize },

    #[error("stride must be at least 1, got {stride}")]
    InvalidStride { stride: i32 },

    #[error("valid frame set not strictly increasing at position {position}: {frame}")]
    UnorderedPlan { position: usize, frame: i32 },

    #[error("decoder starved: expected frame {expected_frame}, no more frames available")]
    DecoderStarved { expected_frame: i32 },

    #[error("expected {expected} channels, got {got}")]
    ChannelArity { expected: usize, got: usize },

    #[error("input columns have mismatched lengths: packets {packets}, args {args}")]
    ColumnMismatch { packets: usize, args: usize },
}

/// Malformed packet or descriptor buffers.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WireError {
    #[error("packet header at offset {offset} truncated: {remaining} bytes remain")]
    TruncatedHeader { offset: usize, remaining: usize },

    #[error("packet at offset {offset} declares {declared} bytes but only {remaining} remain")]
    TruncatedPacket {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("packet at offset {offset} declares negative length {declared}")]
    NegativeLength { offset: usize, declared: i32 },

    #[error("descriptor buffer truncated: needed {needed} bytes, got {got}")]
    TruncatedArgs { needed: usize, got: usize },
}

/// Buffer allocation and cross-device copy errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransferError {
    #[error("no backend available for device {device}")]
    UnsupportedDevice { device: DeviceType },

    #[error("buffer allocation failed: {size} bytes")]
    AllocFailed { size: usize },

    #[error("copy size mismatch: requested {requested}, dst {dst}, src {src}")]
    SizeMismatch {
        requested: usize,
        dst: usize,
        src: usize,
    },
}

/// Decoder backend errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("decoder not configured — call configure() before evaluate()")]
    NotConfigured,

    #[error("no decoder backend available for device {device}")]
    UnsupportedDevice { device: DeviceType },

    #[error("packet payload is {got} bytes, expected one frame of {expected}")]
    FrameSizeMismatch { expected: usize, got: usize },

    #[error("destination buffer is {got} bytes, frame needs {needed}")]
    DestinationTooSmall { needed: usize, got: usize },

    #[error("destination buffer resides on {device}, decoder writes host frames")]
    DestinationNotHost { device: DeviceType },
}

/// Convenience Result type for engine operations.
pub type EvalResult<T> = Result<T, EvalError>;
