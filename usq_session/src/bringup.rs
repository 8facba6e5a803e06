//! The fixed analog front-end bring-up sequence issued by `session_open`
//! (spec §6): channel maps, PGA/LPF/termination/LNA, TGC path selection, and
//! HV enable, with the retry-once behavior §7 calls out for `EnableHV` and
//! `SetHVVoltage`.

use usq_core::{Observer, ProbeAdapterModel, Result, UsqError, Warning};
use usq_driver::OemDriver;

/// Fixed PGA gain applied to every OEM at bring-up.
pub const PGA_GAIN_DB: f64 = 30.0;
/// Fixed analog low-pass cutoff applied to every OEM at bring-up.
pub const LPF_CUTOFF_HZ: f64 = 15e6;
/// Fixed RX active termination applied to every OEM at bring-up.
pub const ACTIVE_TERMINATION_OHM: f64 = 200.0;
/// Fixed LNA gain applied to every OEM at bring-up.
pub const LNA_GAIN_DB: f64 = 24.0;

/// Inclusive HV voltage range, in units of 0.5 Vpp (spec §6 "Voltage range
/// `[0, 90]` x0.5 Vpp").
pub const HV_STEPS_MIN: f64 = 0.0;
pub const HV_STEPS_MAX: f64 = 90.0;

/// Retries `f` once on failure, reporting a [`Warning::DriverRetry`] to
/// `observer` before the retry (spec §7 "first attempt... failed and is
/// being retried").
fn retry_once(observer: &dyn Observer, operation: &str, f: impl Fn() -> Result<()>) -> Result<()> {
    match f() {
        Ok(()) => Ok(()),
        Err(err) => {
            observer.on_warning(Warning::DriverRetry {
                operation: operation.to_string(),
                error: err.to_string(),
            });
            f()
        }
    }
}

/// Programs the static TX/RX channel maps for every OEM, then the fixed
/// analog front-end, then enables HV at `voltage_steps` (spec §6
/// `session_open` side effects).
pub fn bring_up(probe: &ProbeAdapterModel, voltage_steps: f64, driver: &dyn OemDriver, observer: &dyn Observer) -> Result<()> {
    if !(HV_STEPS_MIN..=HV_STEPS_MAX).contains(&voltage_steps) {
        return Err(UsqError::illegal_argument(format!(
            "HV voltage {voltage_steps} steps of 0.5 Vpp is outside [{HV_STEPS_MIN}, {HV_STEPS_MAX}]"
        )));
    }

    for oem in 0..probe.n_oem() {
        let tx_map: Vec<usize> = (0..usq_core::TX_CHANNELS_PER_OEM).map(|c| probe.tx_channel_map(c, oem)).collect();
        let rx_map: Vec<usize> = (0..usq_core::RX_CHANNELS_PER_OEM).map(|c| probe.rx_channel_map(c, oem)).collect();
        driver.program_channel_maps(oem, &tx_map, &rx_map)?;

        driver.set_pga_gain_db(oem, PGA_GAIN_DB)?;
        driver.set_lpf_cutoff_hz(oem, LPF_CUTOFF_HZ)?;
        driver.set_active_termination_ohm(oem, ACTIVE_TERMINATION_OHM)?;
        driver.set_lna_gain_db(oem, LNA_GAIN_DB)?;
        driver.set_dtgc_enabled(oem, false)?;
        driver.set_tgc_enabled(oem, true)?;
    }

    retry_once(observer, "EnableHV", || driver.enable_hv())?;
    retry_once(observer, "SetHVVoltage", || driver.set_hv_voltage(voltage_steps))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use usq_core::AdapterTag;
    use usq_driver::SimulatedOemDriver;

    struct RecordingObserver(Arc<Mutex<Vec<Warning>>>);
    impl Observer for RecordingObserver {
        fn on_warning(&self, warning: Warning) {
            self.0.lock().unwrap().push(warning);
        }
    }

    fn probe(n_oem: usize) -> ProbeAdapterModel {
        ProbeAdapterModel::new(128 * n_oem, 0.3e-3, n_oem, AdapterTag::Packed).unwrap()
    }

    #[test]
    fn bring_up_programs_channel_maps_and_enables_hv_per_oem() {
        let driver = SimulatedOemDriver::new();
        bring_up(&probe(2), 40.0, &driver, &usq_core::NullObserver).unwrap();
        let calls = driver.calls();
        assert!(calls.iter().any(|c| c.starts_with("programChannelMaps(oem=0")));
        assert!(calls.iter().any(|c| c.starts_with("programChannelMaps(oem=1")));
        assert!(calls.iter().any(|c| c == "enableHv()"));
        assert!(calls.iter().any(|c| c.contains("setHvVoltage")));
    }

    #[test]
    fn bring_up_rejects_voltage_outside_range() {
        let driver = SimulatedOemDriver::new();
        let err = bring_up(&probe(1), 91.0, &driver, &usq_core::NullObserver).unwrap_err();
        assert!(matches!(err, UsqError::IllegalArgument(_)));
    }

    #[test]
    fn bring_up_disables_dtgc_and_enables_tgc() {
        let driver = SimulatedOemDriver::new();
        bring_up(&probe(1), 10.0, &driver, &usq_core::NullObserver).unwrap();
        let calls = driver.calls();
        assert!(calls.iter().any(|c| c == "setDtgcEnabled(oem=0, false)"));
        assert!(calls.iter().any(|c| c == "setTgcEnabled(oem=0, true)"));
    }

    /// Wraps the simulated driver but fails `enable_hv`'s first call, to
    /// exercise the retry-once path. Every other method just delegates.
    struct FlakyHvDriver {
        inner: SimulatedOemDriver,
        hv_attempts: Mutex<u32>,
    }

    impl OemDriver for FlakyHvDriver {
        fn enable_hv(&self) -> Result<()> {
            let mut n = self.hv_attempts.lock().unwrap();
            *n += 1;
            if *n == 1 {
                Err(UsqError::driver("simulated transient HV fault"))
            } else {
                self.inner.enable_hv()
            }
        }

        fn program_channel_maps(&self, oem: usize, tx_map: &[usize], rx_map: &[usize]) -> Result<()> {
            self.inner.program_channel_maps(oem, tx_map, rx_map)
        }
        fn set_pga_gain_db(&self, oem: usize, gain_db: f64) -> Result<()> {
            self.inner.set_pga_gain_db(oem, gain_db)
        }
        fn set_lpf_cutoff_hz(&self, oem: usize, cutoff_hz: f64) -> Result<()> {
            self.inner.set_lpf_cutoff_hz(oem, cutoff_hz)
        }
        fn set_active_termination_ohm(&self, oem: usize, ohm: f64) -> Result<()> {
            self.inner.set_active_termination_ohm(oem, ohm)
        }
        fn set_lna_gain_db(&self, oem: usize, gain_db: f64) -> Result<()> {
            self.inner.set_lna_gain_db(oem, gain_db)
        }
        fn set_dtgc_enabled(&self, oem: usize, enabled: bool) -> Result<()> {
            self.inner.set_dtgc_enabled(oem, enabled)
        }
        fn set_tgc_enabled(&self, oem: usize, enabled: bool) -> Result<()> {
            self.inner.set_tgc_enabled(oem, enabled)
        }
        fn set_hv_voltage(&self, steps_of_half_vpp: f64) -> Result<()> {
            self.inner.set_hv_voltage(steps_of_half_vpp)
        }
        fn set_tx_aperture(&self, _oem: usize, _mask_hex: &str, _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_tx_delays(&self, _oem: usize, _delays: &[f64], _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_tx_frequency(&self, _oem: usize, _freq_hz: f64, _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_tx_half_periods(&self, _oem: usize, _half_periods: u32, _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_tx_invert(&self, _oem: usize, _invert: bool, _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_active_channel_group(&self, _oem: usize, _group_mask_hex: &str, _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_rx_aperture(&self, _oem: usize, _mask_hex: &str, _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_rx_time(&self, _oem: usize, _rx_time_s: f64, _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_rx_delay(&self, _oem: usize, _rx_delay_s: f64, _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn tgc_set_samples(&self, _oem: usize, _curve: &[f64], _firing: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_number_of_firings(&self, _oem: usize, _n_fire: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn enable_transmit(&self, _oem: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn enable_receive(&self, _oem: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_n_triggers(&self, _n_trig: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn set_trigger(&self, _tx_pri_s: f64, _sync_in: bool, _sync_out: bool, _index: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn clear_scheduled_receive(&self, _oem: usize) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn schedule_receive(&self, _oem: usize, _offset_samples: usize, _length_samples: usize, _decimation: u32, _start_sample: i64) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn trigger_start(&self) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn trigger_sync(&self) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn trigger_stop(&self) -> Result<()> {
            unimplemented!("not exercised by bring_up")
        }
        fn transfer_all_rx_buffers_to_host(&self, _n_oem: usize, _samples_per_oem: usize) -> Result<Vec<i16>> {
            unimplemented!("not exercised by bring_up")
        }
    }

    #[test]
    fn hv_enable_failure_is_retried_once_and_reported() {
        let driver = FlakyHvDriver { inner: SimulatedOemDriver::new(), hv_attempts: Mutex::new(0) };
        let observer_log = Arc::new(Mutex::new(Vec::new()));
        let observer = RecordingObserver(Arc::clone(&observer_log));
        bring_up(&probe(1), 10.0, &driver, &observer).unwrap();
        assert_eq!(*driver.hv_attempts.lock().unwrap(), 2);
        assert_eq!(observer_log.lock().unwrap().len(), 1);
        assert!(matches!(observer_log.lock().unwrap()[0], Warning::DriverRetry { .. }));
    }
}
