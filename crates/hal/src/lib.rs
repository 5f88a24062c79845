//! `sieve-hal` — Buffer transfer backends.
//!
//! Provides concrete [`BufferTransfer`](sieve_common::BufferTransfer)
//! implementations behind runtime backend selection. The host backend is
//! always available; accelerator backends are selected by declared device
//! capability and their absence degrades to an `UnsupportedDevice` error
//! at construction, never a silent no-op.

pub mod host;
pub mod select;

pub use host::HostTransfer;
pub use select::make_transfer;
