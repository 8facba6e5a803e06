//! Pure bookkeeping for one OEM's firing schedule (spec §4.4): active-channel
//! derivation, per-transmit RX aperture, and the sub-transmit partitioning
//! that rotates physical RX channels through OEM residues modulo 32.
//!
//! Kept separate from [`crate::program`] so the masking math can be unit
//! tested against spec §8's "sub-transmit coverage" property without a
//! driver in the loop.

use usq_core::ProbeAdapterModel;

use usq_dsp::{Plan, ScanKind};

/// `rxApMask[e, t]` for transmit `t`, indexed by element (not physical
/// channel). STA/PWI always receive on every element the probe has; LIN
/// windows to a `rxApSize`-wide run starting at `plan.rx_ap_orig[t]`.
pub fn rx_aperture_mask(kind: ScanKind, plan: &Plan, probe: &ProbeAdapterModel, t: usize) -> Vec<bool> {
    let n_elem = probe.n_elem();
    match kind {
        ScanKind::Sta | ScanKind::Pwi => vec![true; n_elem],
        ScanKind::Lin => {
            let rx_ap_orig = plan.rx_ap_orig.as_ref().expect("LIN plan always carries rx_ap_orig")[t];
            let rx_ap_size = usq_dsp::rx_aperture_size(probe) as i64;
            (0..n_elem as i64).map(|e| e >= rx_ap_orig && e < rx_ap_orig + rx_ap_size).collect()
        }
    }
}

/// `actChan[c, k]` for every physical TX/RX channel `c` on OEM `k` (spec
/// §4.4 "Active-channel derivation"), reusing the adapter formula already
/// validated in [`usq_core::geometry::ProbeAdapterModel`].
pub fn active_channels(probe: &ProbeAdapterModel, oem: usize) -> [bool; 128] {
    let mut bits = [false; 128];
    for (c, slot) in bits.iter_mut().enumerate() {
        *slot = probe.is_active_channel(c, oem);
    }
    bits
}

/// The 16-bit active-channel-group mask for OEM `k`, compressed from the
/// 128-bit active-channel set and reordered via the hardware pin
/// permutation (spec §4.4 `SetActiveChannelGroup`; permutation lives at
/// the driver boundary per design note §9).
pub fn active_channel_group_mask(probe: &ProbeAdapterModel, oem: usize) -> [bool; 16] {
    let act_chan = active_channels(probe, oem);
    let groups = usq_core::mask::compress_to_groups(&act_chan);
    usq_core::mask::permute_group_mask(groups)
}

/// `rxSubApMask[:, k, f]` for sub-transmit `s` of transmit `t` on OEM `k`
/// (spec §4.4 "Sub-transmit partitioning"): the physical channels whose
/// cumulative position among active-and-in-aperture channels falls in the
/// `s`-th group of 32.
pub fn rx_sub_aperture_mask(probe: &ProbeAdapterModel, rx_ap_mask_for_t: &[bool], oem: usize, sub_tx: usize) -> [bool; 128] {
    let mut mask = [false; 128];
    let mut cumulative = 0usize;
    for c in 0..128 {
        let elem = probe.select_elem(c, oem);
        let active = probe.is_active_channel(c, oem);
        let in_aperture = elem < rx_ap_mask_for_t.len() && rx_ap_mask_for_t[elem];
        if active && in_aperture {
            cumulative += 1;
            let group = cumulative.div_ceil(32);
            if group == sub_tx + 1 {
                mask[c] = true;
            }
        }
    }
    mask
}
