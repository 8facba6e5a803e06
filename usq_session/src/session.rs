//! The upstream `Session` (spec §6): `session_open` → `upload` → `run`(`_loop`)
//! → `close`, wiring every other crate in the workspace together behind one
//! handle.

use std::time::Instant;

use usq_acquire::{Acquisition, RfTensor, Sleeper, ThreadSleeper};
use usq_core::{AdapterTag, Observer, ProbeAdapterModel, ProbeDef, Result, UsqError};
use usq_driver::OemDriver;
use usq_dsp::{normalize, plan as build_plan, ScanRequest};
use usq_hw::{program, ProgrammedSequence};

use crate::bringup::bring_up;

/// A live acquisition session bound to one probe/adapter and one
/// [`OemDriver`] (spec §6 "Upstream (consumer API)").
///
/// Dropping a `Session` that was never explicitly [`Session::close`]d still
/// issues `TriggerStop` (spec §5 "close() is the only supported stop"); the
/// explicit `close()` exists so callers can observe and react to the result.
pub struct Session {
    probe: ProbeAdapterModel,
    driver: Box<dyn OemDriver>,
    sleeper: Box<dyn Sleeper>,
    observer: Box<dyn Observer>,
    log_timing: bool,
    programmed: Option<ProgrammedSequence>,
    closed: bool,
}

impl Session {
    /// `session_open` (spec §6): resolves `probe` + `adapter_tag` into a
    /// [`ProbeAdapterModel`] and runs the fixed bring-up sequence against
    /// `driver`.
    ///
    /// `log_timing`, if set, logs `upload`/`run` wall-clock duration at
    /// `debug` level through the `log` facade — the only place this crate's
    /// expanded scope (ambient observability) surfaces per-call timing.
    pub fn open(
        n_oem: usize,
        probe: ProbeDef,
        adapter_tag: AdapterTag,
        voltage_steps: f64,
        log_timing: bool,
        driver: Box<dyn OemDriver>,
        observer: Box<dyn Observer>,
    ) -> Result<Self> {
        let probe_model = ProbeAdapterModel::from_def(&probe, n_oem, adapter_tag)?;
        bring_up(&probe_model, voltage_steps, driver.as_ref(), observer.as_ref())?;
        Ok(Self {
            probe: probe_model,
            driver,
            sleeper: Box::new(ThreadSleeper),
            observer,
            log_timing,
            programmed: None,
            closed: false,
        })
    }

    /// Overrides the default [`ThreadSleeper`], e.g. with
    /// `usq_acquire::NullSleeper` in tests and demos against
    /// [`usq_driver::SimulatedOemDriver`].
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// `upload(request)` (spec §6): runs C2 (normalize), C3 (plan), C4
    /// (program), then arms the trigger engine (`Acquisition::open`).
    pub fn upload(&mut self, request: &ScanRequest) -> Result<()> {
        let started = Instant::now();

        let normalized = normalize(request, &self.probe, self.observer.as_ref())?;
        let plan = build_plan(request.kind, &normalized, &self.probe);
        let programmed = program(request.kind, &plan, &normalized, &self.probe, self.driver.as_ref())?;

        let acquisition = Acquisition::new(self.driver.as_ref(), self.sleeper.as_ref(), self.probe.n_oem(), self.probe.n_elem(), self.probe.adapter_tag());
        acquisition.open(&programmed)?;

        if self.log_timing {
            log::debug!("upload took {:?}", started.elapsed());
        }
        self.programmed = Some(programmed);
        Ok(())
    }

    /// `run()` (spec §6): syncs the trigger engine, transfers, and
    /// demultiplexes into the canonical RF tensor. Must follow a successful
    /// [`Session::upload`].
    pub fn run(&self) -> Result<RfTensor> {
        let started = Instant::now();
        let programmed = self.programmed.as_ref().ok_or_else(|| UsqError::illegal_argument("run() called before upload()"))?;

        let acquisition = Acquisition::new(self.driver.as_ref(), self.sleeper.as_ref(), self.probe.n_oem(), self.probe.n_elem(), self.probe.adapter_tag());
        let tensor = acquisition.run(programmed.kind, programmed)?;

        if self.log_timing {
            log::debug!("run took {:?}", started.elapsed());
        }
        Ok(tensor)
    }

    /// `runLoop(shouldContinue, onFrame)` (spec §6): repeats [`Session::run`]
    /// while `should_continue` returns `true`, handing each frame to
    /// `on_frame` as it arrives. Stops (without propagating) on the first
    /// error from `run()`, leaving the OEMs in the unspecified state §7
    /// describes until `close()` or a new `upload()`.
    pub fn run_loop(&self, mut should_continue: impl FnMut() -> bool, mut on_frame: impl FnMut(RfTensor)) -> Result<()> {
        while should_continue() {
            let tensor = self.run()?;
            on_frame(tensor);
        }
        Ok(())
    }

    /// `close()` (spec §6/§5): issues `TriggerStop`. Safe to call multiple
    /// times; the `Drop` impl calls this too if it was never called
    /// explicitly.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let acquisition = Acquisition::new(self.driver.as_ref(), self.sleeper.as_ref(), self.probe.n_oem(), self.probe.n_elem(), self.probe.adapter_tag());
        acquisition.close()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.close() {
                log::warn!("TriggerStop on session drop failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use usq_acquire::NullSleeper;
    use usq_core::NullObserver;
    use usq_dsp::ScanRequestBuilder;
    use usq_driver::SimulatedOemDriver;

    /// Shares one [`SimulatedOemDriver`] between a `Session` (which needs to
    /// own its driver) and the test (which needs to inspect it after the
    /// session is dropped).
    struct SharedDriver(Arc<SimulatedOemDriver>);

    impl OemDriver for SharedDriver {
        fn program_channel_maps(&self, oem: usize, tx_map: &[usize], rx_map: &[usize]) -> Result<()> {
            self.0.program_channel_maps(oem, tx_map, rx_map)
        }
        fn set_pga_gain_db(&self, oem: usize, gain_db: f64) -> Result<()> {
            self.0.set_pga_gain_db(oem, gain_db)
        }
        fn set_lpf_cutoff_hz(&self, oem: usize, cutoff_hz: f64) -> Result<()> {
            self.0.set_lpf_cutoff_hz(oem, cutoff_hz)
        }
        fn set_active_termination_ohm(&self, oem: usize, ohm: f64) -> Result<()> {
            self.0.set_active_termination_ohm(oem, ohm)
        }
        fn set_lna_gain_db(&self, oem: usize, gain_db: f64) -> Result<()> {
            self.0.set_lna_gain_db(oem, gain_db)
        }
        fn set_dtgc_enabled(&self, oem: usize, enabled: bool) -> Result<()> {
            self.0.set_dtgc_enabled(oem, enabled)
        }
        fn set_tgc_enabled(&self, oem: usize, enabled: bool) -> Result<()> {
            self.0.set_tgc_enabled(oem, enabled)
        }
        fn enable_hv(&self) -> Result<()> {
            self.0.enable_hv()
        }
        fn set_hv_voltage(&self, steps_of_half_vpp: f64) -> Result<()> {
            self.0.set_hv_voltage(steps_of_half_vpp)
        }
        fn set_tx_aperture(&self, oem: usize, mask_hex: &str, firing: usize) -> Result<()> {
            self.0.set_tx_aperture(oem, mask_hex, firing)
        }
        fn set_tx_delays(&self, oem: usize, delays: &[f64], firing: usize) -> Result<()> {
            self.0.set_tx_delays(oem, delays, firing)
        }
        fn set_tx_frequency(&self, oem: usize, freq_hz: f64, firing: usize) -> Result<()> {
            self.0.set_tx_frequency(oem, freq_hz, firing)
        }
        fn set_tx_half_periods(&self, oem: usize, half_periods: u32, firing: usize) -> Result<()> {
            self.0.set_tx_half_periods(oem, half_periods, firing)
        }
        fn set_tx_invert(&self, oem: usize, invert: bool, firing: usize) -> Result<()> {
            self.0.set_tx_invert(oem, invert, firing)
        }
        fn set_active_channel_group(&self, oem: usize, group_mask_hex: &str, firing: usize) -> Result<()> {
            self.0.set_active_channel_group(oem, group_mask_hex, firing)
        }
        fn set_rx_aperture(&self, oem: usize, mask_hex: &str, firing: usize) -> Result<()> {
            self.0.set_rx_aperture(oem, mask_hex, firing)
        }
        fn set_rx_time(&self, oem: usize, rx_time_s: f64, firing: usize) -> Result<()> {
            self.0.set_rx_time(oem, rx_time_s, firing)
        }
        fn set_rx_delay(&self, oem: usize, rx_delay_s: f64, firing: usize) -> Result<()> {
            self.0.set_rx_delay(oem, rx_delay_s, firing)
        }
        fn tgc_set_samples(&self, oem: usize, curve: &[f64], firing: usize) -> Result<()> {
            self.0.tgc_set_samples(oem, curve, firing)
        }
        fn set_number_of_firings(&self, oem: usize, n_fire: usize) -> Result<()> {
            self.0.set_number_of_firings(oem, n_fire)
        }
        fn enable_transmit(&self, oem: usize) -> Result<()> {
            self.0.enable_transmit(oem)
        }
        fn enable_receive(&self, oem: usize) -> Result<()> {
            self.0.enable_receive(oem)
        }
        fn set_n_triggers(&self, n_trig: usize) -> Result<()> {
            self.0.set_n_triggers(n_trig)
        }
        fn set_trigger(&self, tx_pri_s: f64, sync_in: bool, sync_out: bool, index: usize) -> Result<()> {
            self.0.set_trigger(tx_pri_s, sync_in, sync_out, index)
        }
        fn clear_scheduled_receive(&self, oem: usize) -> Result<()> {
            self.0.clear_scheduled_receive(oem)
        }
        fn schedule_receive(&self, oem: usize, offset_samples: usize, length_samples: usize, decimation: u32, start_sample: i64) -> Result<()> {
            self.0.schedule_receive(oem, offset_samples, length_samples, decimation, start_sample)
        }
        fn trigger_start(&self) -> Result<()> {
            self.0.trigger_start()
        }
        fn trigger_sync(&self) -> Result<()> {
            self.0.trigger_sync()
        }
        fn trigger_stop(&self) -> Result<()> {
            self.0.trigger_stop()
        }
        fn transfer_all_rx_buffers_to_host(&self, n_oem: usize, samples_per_oem: usize) -> Result<Vec<i16>> {
            self.0.transfer_all_rx_buffers_to_host(n_oem, samples_per_oem)
        }
    }

    fn open_session(n_oem: usize) -> Session {
        let probe = ProbeDef { name: "test".into(), n_elem: 128 * n_oem, pitch: 0.3e-3 };
        Session::open(n_oem, probe, AdapterTag::Packed, 40.0, false, Box::new(SimulatedOemDriver::new()), Box::new(NullObserver))
            .unwrap()
            .with_sleeper(Box::new(NullSleeper))
    }

    fn pwi_request() -> ScanRequest {
        ScanRequestBuilder::new(1450.0, 5e6, 2).rx_depth_range(0.0, 0.02).build_pwi(vec![0.0], 0.0, 128.0)
    }

    #[test]
    fn session_open_runs_bring_up() {
        open_session(1);
    }

    #[test]
    fn run_before_upload_is_an_illegal_argument() {
        let session = open_session(1);
        let err = session.run().unwrap_err();
        assert!(matches!(err, UsqError::IllegalArgument(_)));
    }

    #[test]
    fn upload_then_run_returns_a_tensor_with_the_expected_shape() {
        let mut session = open_session(1);
        session.upload(&pwi_request()).unwrap();
        let tensor = session.run().unwrap();
        assert_eq!(tensor.shape().2, 1); // one transmit
    }

    #[test]
    fn run_loop_invokes_the_callback_once_per_iteration() {
        let mut session = open_session(1);
        session.upload(&pwi_request()).unwrap();
        let mut frames = 0;
        let mut remaining = 3;
        session
            .run_loop(
                || {
                    if remaining == 0 {
                        false
                    } else {
                        remaining -= 1;
                        true
                    }
                },
                |_tensor| frames += 1,
            )
            .unwrap();
        assert_eq!(frames, 3);
    }

    #[test]
    fn drop_without_explicit_close_still_issues_trigger_stop() {
        let driver = Arc::new(SimulatedOemDriver::new());
        let probe = ProbeDef { name: "test".into(), n_elem: 128, pitch: 0.3e-3 };
        let session = Session::open(1, probe, AdapterTag::Packed, 40.0, false, Box::new(SharedDriver(Arc::clone(&driver))), Box::new(NullObserver))
            .unwrap()
            .with_sleeper(Box::new(NullSleeper));
        drop(session);
        assert!(driver.calls().iter().any(|c| c == "triggerStop()"));
    }

    #[test]
    fn explicit_close_issues_trigger_stop_and_is_idempotent() {
        let mut session = open_session(1);
        session.close().unwrap();
        session.close().unwrap();
    }
}
