//! C5 acquisition control: `open`/`run`/`close` (spec §4.5), driving an
//! [`usq_driver::OemDriver`] through the trigger engine and handing the raw
//! transfer to [`crate::demux::demultiplex`].

use std::time::Duration;

use usq_core::{AdapterTag, Result};
use usq_dsp::ScanKind;
use usq_driver::OemDriver;
use usq_hw::ProgrammedSequence;

use crate::demux::demultiplex;
use crate::sleeper::Sleeper;
use crate::tensor::RfTensor;

/// Upper-bound multiplier on the worst-case scan duration used for both
/// open-loop sleeps (spec §5).
pub const PAUSE_MULTIP: f64 = 1.5;

fn worst_case_pause(programmed: &ProgrammedSequence) -> Duration {
    let secs = PAUSE_MULTIP * programmed.tx_pri * programmed.n_trig as f64;
    Duration::from_secs_f64(secs.max(0.0))
}

/// Drives one acquisition session's `open`/`run`/`close` cycle against an
/// [`OemDriver`] already programmed by [`usq_hw::program`].
pub struct Acquisition<'a> {
    driver: &'a dyn OemDriver,
    sleeper: &'a dyn Sleeper,
    n_oem: usize,
    n_elem: usize,
    adapter: AdapterTag,
}

impl<'a> Acquisition<'a> {
    pub fn new(driver: &'a dyn OemDriver, sleeper: &'a dyn Sleeper, n_oem: usize, n_elem: usize, adapter: AdapterTag) -> Self {
        Self { driver, sleeper, n_oem, n_elem, adapter }
    }

    /// `TriggerStart()` on OEM 0, then the open-loop wait (spec §4.5
    /// `open()`).
    pub fn open(&self, programmed: &ProgrammedSequence) -> Result<()> {
        self.driver.trigger_start()?;
        self.sleeper.sleep(worst_case_pause(programmed));
        Ok(())
    }

    /// Arms receive on every OEM, syncs the trigger engine, waits, then
    /// bulk-transfers and demultiplexes (spec §4.5 `run()`).
    pub fn run(&self, kind: ScanKind, programmed: &ProgrammedSequence) -> Result<RfTensor> {
        for oem in 0..self.n_oem {
            self.driver.enable_receive(oem)?;
        }
        self.driver.trigger_sync()?;
        self.sleeper.sleep(worst_case_pause(programmed));

        let samples_per_oem = programmed.n_samp as usize * programmed.n_trig;
        let raw = self.driver.transfer_all_rx_buffers_to_host(self.n_oem, samples_per_oem)?;
        Ok(demultiplex(kind, self.adapter, self.n_oem, self.n_elem, programmed, &raw))
    }

    /// `TriggerStop()` on OEM 0 — the only supported stop (spec §4.5
    /// `close()`, §5 "no cancellation path mid-acquisition").
    pub fn close(&self) -> Result<()> {
        self.driver.trigger_stop()
    }
}
