//! # USQ Driver
//!
//! The downstream hardware driver contract (spec §6 "Downstream") and a
//! deterministic simulated implementation for tests and demos, kept in its
//! own crate so `usq_hw`/`usq_session` depend on an interface rather than a
//! concrete transport.

pub mod driver;
pub mod simulated;

pub use driver::OemDriver;
pub use simulated::SimulatedOemDriver;
