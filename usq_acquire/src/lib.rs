//! # USQ Acquire
//!
//! C5 — Acquisition & Demultiplexer (spec §4.5). Arms the OEMs, runs the
//! trigger engine against an [`usq_driver::OemDriver`], transfers the raw
//! per-OEM buffers, and reshapes/permutes/aligns them into the canonical
//! 4-D RF tensor `[samples, channels, transmits, repetitions]`.

pub mod acquisition;
pub mod demux;
pub mod sleeper;
pub mod tensor;

pub use acquisition::Acquisition;
pub use demux::demultiplex;
pub use sleeper::{NullSleeper, Sleeper, ThreadSleeper};
pub use tensor::RfTensor;
