//! `sieve-engine` — The decode-and-sample engine.
//!
//! Given a stream of length-prefixed compressed packets and a declarative
//! sampling descriptor, the engine drives a [`DecoderPort`] packet by
//! packet and materializes exactly the frames the sampling plan retains,
//! discarding the rest without copying them. It is one pluggable stage of
//! a larger video-analysis pipeline, exposed through the
//! [`Evaluator`](evaluator::Evaluator) contract.
//!
//! # Module overview
//!
//! - [`sampling`] — turns a descriptor plus warmup state into the ordered
//!   set of frame indices to retain
//! - [`packets`] — bounds-checked cursor over the length-prefixed packet
//!   wire format
//! - [`staging`] — scoped host staging of device-resident input buffers
//! - [`evaluator`] — the engine state machine and its pipeline facade
//!
//! [`DecoderPort`]: sieve_common::DecoderPort

pub mod evaluator;
pub mod packets;
pub mod sampling;
pub mod staging;

pub use evaluator::{
    DecodeEvaluator, DecodeEvaluatorFactory, Evaluator, EvaluatorCapabilities, EvaluatorConfig,
    EvaluatorFactory, ARGS_CHANNEL, FRAME_CHANNEL, PACKET_CHANNEL,
};
pub use packets::{encode_packets, Packet, PacketCursor};
pub use sampling::{plan_frames, SamplePlan};
pub use staging::{resolve_host, HostBytes, StagingGuard};
