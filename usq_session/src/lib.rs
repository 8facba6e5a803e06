//! # USQ Session
//!
//! The upstream consumer API (spec §6): [`Session`] wires the probe/adapter
//! model (C1), sequence normalizer (C2), aperture/delay planner (C3),
//! hardware programmer (C4), and acquisition/demultiplexer (C5) together
//! behind `session_open`/`upload`/`run`/`run_loop`/`close`.

pub mod bringup;
pub mod probe_catalog;
pub mod session;

pub use probe_catalog::probe_by_name;
pub use session::Session;
