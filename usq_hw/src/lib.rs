//! # USQ HW
//!
//! C4 — Hardware Programmer (spec §4.4). Lowers a [`usq_dsp::Plan`] and its
//! [`usq_dsp::NormalizedSequence`] into a deterministic sequence of OEM
//! commands issued against an [`usq_driver::OemDriver`]: TX apertures,
//! delays, frequency/half-periods, active-channel groups, RX sub-apertures,
//! TGC samples, the trigger table, and the scheduled-receive table.
//!
//! This crate owns the §3 invariants that can only be checked once `nFire`/
//! `nRep`/`nTrig` are known (2-4); invariants 1 and 5 are already enforced
//! earlier, in `usq_dsp::normalize`.

pub mod program;
pub mod schedule;

pub use program::{program, ProgrammedSequence};
