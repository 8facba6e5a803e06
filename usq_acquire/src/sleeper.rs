//! The open-loop sleeps that stand in for the two fixed waits of spec §5
//! ("Duration of (a) and (b) is `pauseMultip * txPri * nTrig`; this is an
//! upper-bound sleep... not a tight synchronization primitive").
//!
//! Modeled as a trait rather than a bare `std::thread::sleep` call so tests
//! and demos can run a multi-second worst-case wait instantaneously,
//! mirroring how [`usq_core::Observer`] decouples warning delivery from any
//! particular sink.

use std::time::Duration;

/// The seam `Acquisition` sleeps through at its two open-loop suspension
/// points (spec §5).
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps for real, via `std::thread::sleep`. The default for anything
/// talking to real hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Does not sleep at all. Used by tests and by the simulated driver demos,
/// where the worst-case wait would otherwise dominate wall-clock time for
/// no benefit (the simulated driver has no real acquisition to wait on).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSleeper;

impl Sleeper for NullSleeper {
    fn sleep(&self, _duration: Duration) {}
}
