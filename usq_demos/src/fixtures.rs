//! Shared session/probe setup for the example binaries in `examples/`.

use usq_core::{AdapterTag, LogObserver, ProbeDef};
use usq_acquire::NullSleeper;
use usq_driver::SimulatedOemDriver;
use usq_session::Session;

/// Opens a `Session` against a fresh [`SimulatedOemDriver`], with the
/// open-loop sleeps disabled so the demos run instantly.
pub fn open_demo_session(n_oem: usize, n_elem: usize) -> Session {
    let probe = ProbeDef { name: "demo".to_string(), n_elem, pitch: 0.3e-3 };
    Session::open(n_oem, probe, AdapterTag::Packed, 40.0, true, Box::new(SimulatedOemDriver::new()), Box::new(LogObserver))
        .expect("simulated bring-up never fails")
        .with_sleeper(Box::new(NullSleeper))
}
