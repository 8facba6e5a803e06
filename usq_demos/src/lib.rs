//! USQ Demos
//!
//! This crate is for experimenting with the rest of the workspace against
//! [`usq_driver::SimulatedOemDriver`] — no real hardware is required to run
//! any example here.

pub mod fixtures;
