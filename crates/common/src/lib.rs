//! `sieve-common` — Shared types, traits, and errors for the VideoSieve engine.
//!
//! This crate is the foundation that all other engine crates depend on.
//! It defines the core abstractions:
//!
//! - **Types**: `DeviceType`, `DeviceHandle`, `VideoMetadata` (device/stream identity)
//! - **Buffers**: `FrameBuffer`, ownership-tagged handles that cross device boundaries
//! - **Ports**: `DecoderPort`, `BufferTransfer` (backend abstraction)
//! - **Sampling**: `SampleArgs`, `SamplingMode` and their binary wire codec
//! - **Profiling**: `Profiler` sink trait with null and in-memory implementations
//! - **Errors**: `EvalError`, `ContractViolation`, `WireError`, etc. (thiserror-based)

pub mod buffer;
pub mod error;
pub mod ports;
pub mod profile;
pub mod sampling;
pub mod types;

// Re-export commonly used items at crate root
pub use buffer::{BufferStorage, Channel, FrameBuffer, Ownership};
pub use error::{
    ContractViolation, DecodeError, EvalError, EvalResult, TransferError, WireError,
};
pub use ports::{BufferTransfer, DecoderPort};
pub use profile::{IntervalRecord, MemoryProfiler, NullProfiler, Profiler};
pub use sampling::{decode_sample_args, encode_sample_args, Interval, SampleArgs, SamplingMode};
pub use types::{DeviceHandle, DeviceType, VideoMetadata};
