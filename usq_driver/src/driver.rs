use usq_core::Result;

/// The downstream hardware driver contract (spec §6 "Downstream").
///
/// One `OemDriver` instance fronts every OEM module in a session; `oem` is
/// the physical module index `[0, nOEM)`. Commands documented as
/// "OEM-global" in the spec (trigger table, HV, bulk transfer) are still
/// reached through this same trait but are only ever invoked by the rest of
/// the workspace against `oem == 0` or without an OEM argument. This is the
/// single seam between the sequencing/programming logic and whatever
/// actually talks to hardware.
///
/// All calls are synchronous; an implementation that talks to real
/// hardware is expected to block until the command completes or fails.
/// Every method but `enable_hv`/`set_hv_voltage` propagates its error
/// unchanged — the retry-once behavior for those two lives in the caller
/// (`usq_session`'s bring-up sequence), not here.
pub trait OemDriver: Send + Sync {
    /// Programs the static TX/RX channel maps for `oem` (spec §6
    /// `session_open`).
    fn program_channel_maps(&self, oem: usize, tx_map: &[usize], rx_map: &[usize]) -> Result<()>;

    /// Sets the analog front-end PGA gain in dB.
    fn set_pga_gain_db(&self, oem: usize, gain_db: f64) -> Result<()>;
    /// Sets the analog low-pass filter cutoff in Hz.
    fn set_lpf_cutoff_hz(&self, oem: usize, cutoff_hz: f64) -> Result<()>;
    /// Sets the RX active termination in ohms.
    fn set_active_termination_ohm(&self, oem: usize, ohm: f64) -> Result<()>;
    /// Sets the LNA gain in dB.
    fn set_lna_gain_db(&self, oem: usize, gain_db: f64) -> Result<()>;
    /// Enables or disables the digital TGC path (session bring-up disables it).
    fn set_dtgc_enabled(&self, oem: usize, enabled: bool) -> Result<()>;
    /// Enables or disables the analog TGC path (session bring-up enables it).
    fn set_tgc_enabled(&self, oem: usize, enabled: bool) -> Result<()>;

    /// Enables high-voltage transmit. Retried once by the caller on failure.
    fn enable_hv(&self) -> Result<()>;
    /// Sets the HV rail, in units of 0.5 Vpp over `[0, 90]`. Retried once by
    /// the caller on failure.
    fn set_hv_voltage(&self, steps_of_half_vpp: f64) -> Result<()>;

    // -- Per-firing programming (spec §4.4 "OEM loading") --------------

    fn set_tx_aperture(&self, oem: usize, mask_hex: &str, firing: usize) -> Result<()>;
    /// `delays`: seconds, one entry per physical TX channel on `oem` (128).
    fn set_tx_delays(&self, oem: usize, delays: &[f64], firing: usize) -> Result<()>;
    fn set_tx_frequency(&self, oem: usize, freq_hz: f64, firing: usize) -> Result<()>;
    fn set_tx_half_periods(&self, oem: usize, half_periods: u32, firing: usize) -> Result<()>;
    fn set_tx_invert(&self, oem: usize, invert: bool, firing: usize) -> Result<()>;
    /// `group_mask_hex` is the 16-bit active-channel-group mask, already
    /// permuted per spec §4.4's fixed reordering.
    fn set_active_channel_group(&self, oem: usize, group_mask_hex: &str, firing: usize) -> Result<()>;
    fn set_rx_aperture(&self, oem: usize, mask_hex: &str, firing: usize) -> Result<()>;
    fn set_rx_time(&self, oem: usize, rx_time_s: f64, firing: usize) -> Result<()>;
    fn set_rx_delay(&self, oem: usize, rx_delay_s: f64, firing: usize) -> Result<()>;
    /// `curve`: the normalized `[0, 1]` TGC curve from `usq_dsp::tgc`.
    fn tgc_set_samples(&self, oem: usize, curve: &[f64], firing: usize) -> Result<()>;

    fn set_number_of_firings(&self, oem: usize, n_fire: usize) -> Result<()>;
    fn enable_transmit(&self, oem: usize) -> Result<()>;
    fn enable_receive(&self, oem: usize) -> Result<()>;

    // -- Trigger table, OEM 0 only (spec §4.4 "Trigger table") ----------

    fn set_n_triggers(&self, n_trig: usize) -> Result<()>;
    fn set_trigger(&self, tx_pri_s: f64, sync_in: bool, sync_out: bool, index: usize) -> Result<()>;

    // -- Scheduled receive (spec §4.4 "Scheduled receive") --------------

    fn clear_scheduled_receive(&self, oem: usize) -> Result<()>;
    fn schedule_receive(&self, oem: usize, offset_samples: usize, length_samples: usize, decimation: u32, start_sample: i64) -> Result<()>;

    // -- Acquisition (spec §4.5) -----------------------------------------

    /// Issued on OEM 0 only.
    fn trigger_start(&self) -> Result<()>;
    /// Issued on OEM 0 only.
    fn trigger_sync(&self) -> Result<()>;
    /// Issued on OEM 0 only.
    fn trigger_stop(&self) -> Result<()>;

    /// Bulk-reads every OEM's RX DDR buffer into one flat `int16` host
    /// buffer. `samples_per_oem` is `nSamp * nTrig` (spec §4.5 `run`);
    /// the returned buffer is `nOEM * 32 * samples_per_oem` samples, laid
    /// out OEM-major, matching `TransferAllRXBuffersToHost`.
    fn transfer_all_rx_buffers_to_host(&self, n_oem: usize, samples_per_oem: usize) -> Result<Vec<i16>>;
}
