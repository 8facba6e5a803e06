//! # USQ DSP
//!
//! Sequence normalization (spec §4.2, component C2) and aperture/delay
//! planning (spec §4.3, component C3): turns a caller's [`ScanRequest`]
//! into a [`Plan`] ready for the hardware programmer.

pub mod aperture;
pub mod delays;
pub mod normalize;
pub mod plan;
pub mod request;
pub mod subtx;
pub mod tgc;

pub use normalize::{normalize, NormalizedSequence};
pub use plan::{plan, rx_aperture_size, Plan};
pub use request::{ApertureSize, Repetitions, RxWindow, ScanKind, ScanRequest, ScanRequestBuilder, TxAperturePosition};
