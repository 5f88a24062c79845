//! `sieve-decoder` — Decoder port backends.
//!
//! Concrete implementations of the
//! [`DecoderPort`](sieve_common::DecoderPort) trait, selected at engine
//! construction by declared device capability:
//!
//! - [`raw::RawFrameDecoder`] — host backend; each packet payload is one
//!   raw frame, with a configurable display delay that models the frame
//!   reordering buffer of a real hardware decoder.
//! - Accelerator backends register in [`select`] when compiled in;
//!   without one, a GPU request fails at construction.

pub mod raw;
pub mod select;

pub use raw::RawFrameDecoder;
pub use select::{make_decoder, DecoderBackend};
