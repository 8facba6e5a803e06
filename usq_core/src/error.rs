//! Error and warning types shared across the sequencer workspace.

/// Result type alias for sequencer operations.
pub type Result<T> = std::result::Result<T, UsqError>;

/// The two error kinds the system surfaces synchronously (spec §7), plus the
/// driver-transport variant every downstream crate needs to wrap.
#[derive(Debug, thiserror::Error)]
pub enum UsqError {
    /// A malformed request or a violated invariant from the data model
    /// (odd varargs, unknown scan type, bad probe name, value out of range,
    /// or any of the §3 hardware invariants).
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// The 4 GB-per-OEM DDR buffer budget would be exceeded.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The downstream hardware driver reported a failure that is not one of
    /// the two retried calls (`EnableHV`/`SetHVVoltage`); these propagate
    /// unchanged per §7.
    #[error("driver error: {0}")]
    Driver(String),
}

impl UsqError {
    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        UsqError::IllegalArgument(msg.into())
    }

    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        UsqError::OutOfMemory(msg.into())
    }

    pub fn driver(msg: impl Into<String>) -> Self {
        UsqError::Driver(msg.into())
    }
}

/// Non-fatal conditions reported to an [`Observer`] rather than aborting the
/// call that produced them (spec §7).
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A requested TGC value fell outside `[14, 54]` dB and was clamped.
    TgcClamped { requested_db: f64, clamped_db: f64 },

    /// The first attempt at a driver call failed and is being retried once.
    DriverRetry { operation: String, error: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::TgcClamped { requested_db, clamped_db } => {
                write!(f, "TGC value {requested_db:.3} dB clamped to {clamped_db:.3} dB")
            }
            Warning::DriverRetry { operation, error } => {
                write!(f, "{operation} failed ({error}), retrying once")
            }
        }
    }
}

/// Receives non-fatal [`Warning`]s emitted during normalization, programming,
/// and session bring-up. This is the seam an embedding application hooks to
/// surface warnings to its own UI/telemetry.
pub trait Observer: Send + Sync {
    fn on_warning(&self, warning: Warning);
}

/// An [`Observer`] that forwards every warning to the `log` crate at `warn!`
/// level. The default observer for consumers that do not need custom
/// handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_warning(&self, warning: Warning) {
        log::warn!("{warning}");
    }
}

/// An [`Observer`] that silently discards warnings, useful for tests that
/// assert on return values only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_warning(&self, _warning: Warning) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingObserver(Arc<Mutex<Vec<Warning>>>);

    impl Observer for RecordingObserver {
        fn on_warning(&self, warning: Warning) {
            self.0.lock().unwrap().push(warning);
        }
    }

    #[test]
    fn recording_observer_collects_warnings() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let observer = RecordingObserver(Arc::clone(&log));
        observer.on_warning(Warning::TgcClamped {
            requested_db: 5.0,
            clamped_db: 14.0,
        });
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn null_observer_does_not_panic() {
        NullObserver.on_warning(Warning::DriverRetry {
            operation: "EnableHV".into(),
            error: "timeout".into(),
        });
    }
}
