//! # USQ Core
//!
//! Foundational types shared by every crate in the ultrasound TX/RX
//! sequencer workspace: the error/warning/observer types (spec §7), scalar
//! math (spec §4.2-§4.3), channel-mask bit encoding (spec §4.4 "mask
//! encoding"), and the probe/adapter geometry model (spec §4.1, component
//! C1).

pub mod error;
pub mod geometry;
pub mod mask;
pub mod math;

pub use error::{LogObserver, NullObserver, Observer, Result, UsqError, Warning};
pub use geometry::{AdapterTag, ProbeAdapterModel, ProbeDef, RX_CHANNELS_PER_OEM, TX_CHANNELS_PER_OEM};
