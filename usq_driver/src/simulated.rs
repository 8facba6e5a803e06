use std::sync::Mutex;

use usq_core::Result;

use crate::driver::OemDriver;

/// A deterministic, in-memory [`OemDriver`] with no real hardware behind
/// it. Records every call it receives and synthesizes RF data from a fixed
/// pattern rather than sampling anything, so a test or demo run is fully
/// reproducible.
///
/// Every mutating method logs at `trace!` level and appends to an internal
/// call log, inspectable via [`SimulatedOemDriver::calls`].
#[derive(Debug, Default)]
pub struct SimulatedOemDriver {
    calls: Mutex<Vec<String>>,
}

impl SimulatedOemDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self, call: impl Into<String>) {
        let call = call.into();
        log::trace!("{call}");
        self.calls.lock().unwrap().push(call);
    }

    /// Returns the ordered list of every call issued against this driver so
    /// far, formatted for test assertions.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl OemDriver for SimulatedOemDriver {
    fn program_channel_maps(&self, oem: usize, tx_map: &[usize], rx_map: &[usize]) -> Result<()> {
        self.log(format!("programChannelMaps(oem={oem}, tx_len={}, rx_len={})", tx_map.len(), rx_map.len()));
        Ok(())
    }

    fn set_pga_gain_db(&self, oem: usize, gain_db: f64) -> Result<()> {
        self.log(format!("setPgaGain(oem={oem}, {gain_db} dB)"));
        Ok(())
    }

    fn set_lpf_cutoff_hz(&self, oem: usize, cutoff_hz: f64) -> Result<()> {
        self.log(format!("setLpfCutoff(oem={oem}, {cutoff_hz} Hz)"));
        Ok(())
    }

    fn set_active_termination_ohm(&self, oem: usize, ohm: f64) -> Result<()> {
        self.log(format!("setActiveTermination(oem={oem}, {ohm} ohm)"));
        Ok(())
    }

    fn set_lna_gain_db(&self, oem: usize, gain_db: f64) -> Result<()> {
        self.log(format!("setLnaGain(oem={oem}, {gain_db} dB)"));
        Ok(())
    }

    fn set_dtgc_enabled(&self, oem: usize, enabled: bool) -> Result<()> {
        self.log(format!("setDtgcEnabled(oem={oem}, {enabled})"));
        Ok(())
    }

    fn set_tgc_enabled(&self, oem: usize, enabled: bool) -> Result<()> {
        self.log(format!("setTgcEnabled(oem={oem}, {enabled})"));
        Ok(())
    }

    fn enable_hv(&self) -> Result<()> {
        self.log("enableHv()");
        Ok(())
    }

    fn set_hv_voltage(&self, steps_of_half_vpp: f64) -> Result<()> {
        self.log(format!("setHvVoltage({steps_of_half_vpp})"));
        Ok(())
    }

    fn set_tx_aperture(&self, oem: usize, mask_hex: &str, firing: usize) -> Result<()> {
        self.log(format!("setTxAperture(oem={oem}, firing={firing}, mask={mask_hex})"));
        Ok(())
    }

    fn set_tx_delays(&self, oem: usize, delays: &[f64], firing: usize) -> Result<()> {
        self.log(format!("setTxDelays(oem={oem}, firing={firing}, n={})", delays.len()));
        Ok(())
    }

    fn set_tx_frequency(&self, oem: usize, freq_hz: f64, firing: usize) -> Result<()> {
        self.log(format!("setTxFrequency(oem={oem}, firing={firing}, {freq_hz} Hz)"));
        Ok(())
    }

    fn set_tx_half_periods(&self, oem: usize, half_periods: u32, firing: usize) -> Result<()> {
        self.log(format!("setTxHalfPeriods(oem={oem}, firing={firing}, {half_periods})"));
        Ok(())
    }

    fn set_tx_invert(&self, oem: usize, invert: bool, firing: usize) -> Result<()> {
        self.log(format!("setTxInvert(oem={oem}, firing={firing}, {invert})"));
        Ok(())
    }

    fn set_active_channel_group(&self, oem: usize, group_mask_hex: &str, firing: usize) -> Result<()> {
        self.log(format!("setActiveChannelGroup(oem={oem}, firing={firing}, mask={group_mask_hex})"));
        Ok(())
    }

    fn set_rx_aperture(&self, oem: usize, mask_hex: &str, firing: usize) -> Result<()> {
        self.log(format!("setRxAperture(oem={oem}, firing={firing}, mask={mask_hex})"));
        Ok(())
    }

    fn set_rx_time(&self, oem: usize, rx_time_s: f64, firing: usize) -> Result<()> {
        self.log(format!("setRxTime(oem={oem}, firing={firing}, {rx_time_s}s)"));
        Ok(())
    }

    fn set_rx_delay(&self, oem: usize, rx_delay_s: f64, firing: usize) -> Result<()> {
        self.log(format!("setRxDelay(oem={oem}, firing={firing}, {rx_delay_s}s)"));
        Ok(())
    }

    fn tgc_set_samples(&self, oem: usize, curve: &[f64], firing: usize) -> Result<()> {
        self.log(format!("tgcSetSamples(oem={oem}, firing={firing}, n={})", curve.len()));
        Ok(())
    }

    fn set_number_of_firings(&self, oem: usize, n_fire: usize) -> Result<()> {
        self.log(format!("setNumberOfFirings(oem={oem}, {n_fire})"));
        Ok(())
    }

    fn enable_transmit(&self, oem: usize) -> Result<()> {
        self.log(format!("enableTransmit(oem={oem})"));
        Ok(())
    }

    fn enable_receive(&self, oem: usize) -> Result<()> {
        self.log(format!("enableReceive(oem={oem})"));
        Ok(())
    }

    fn set_n_triggers(&self, n_trig: usize) -> Result<()> {
        self.log(format!("setNTriggers({n_trig})"));
        Ok(())
    }

    fn set_trigger(&self, tx_pri_s: f64, sync_in: bool, sync_out: bool, index: usize) -> Result<()> {
        self.log(format!("setTrigger(index={index}, pri={tx_pri_s}s, syncIn={sync_in}, syncOut={sync_out})"));
        Ok(())
    }

    fn clear_scheduled_receive(&self, oem: usize) -> Result<()> {
        self.log(format!("clearScheduledReceive(oem={oem})"));
        Ok(())
    }

    fn schedule_receive(&self, oem: usize, offset_samples: usize, length_samples: usize, decimation: u32, start_sample: i64) -> Result<()> {
        self.log(format!("scheduleReceive(oem={oem}, offset={offset_samples}, length={length_samples}, decimation={decimation}, start={start_sample})"));
        Ok(())
    }

    fn trigger_start(&self) -> Result<()> {
        self.log("triggerStart()");
        Ok(())
    }

    fn trigger_sync(&self) -> Result<()> {
        self.log("triggerSync()");
        Ok(())
    }

    fn trigger_stop(&self) -> Result<()> {
        self.log("triggerStop()");
        Ok(())
    }

    fn transfer_all_rx_buffers_to_host(&self, n_oem: usize, samples_per_oem: usize) -> Result<Vec<i16>> {
        self.log(format!("transferAllRxBuffersToHost(nOem={n_oem}, samplesPerOem={samples_per_oem})"));
        let total = n_oem * 32 * samples_per_oem;
        // Deterministic synthetic RF: a ramp modulo i16::MAX, distinct per
        // OEM so demultiplexer tests can tell OEMs apart.
        let mut buf = Vec::with_capacity(total);
        for oem in 0..n_oem {
            for i in 0..(32 * samples_per_oem) {
                let value = ((oem as i64 * 31 + i as i64) % 2048) as i16;
                buf.push(value);
            }
        }
        Ok(buf)
    }
}
