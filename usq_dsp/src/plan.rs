//! C3 — Aperture & Delay Planner (spec §4.3).
//!
//! [`plan`] ties together the aperture mask ([`crate::aperture`]), the raw
//! delay profiles ([`crate::delays`]), a two-stage delay normalization
//! (causality then center-alignment), row extension to the physical channel
//! space, and the sub-transmit count ([`crate::subtx`]).

use usq_core::math::interp_xy;
use usq_core::ProbeAdapterModel;

use crate::aperture::tx_aperture_mask;
use crate::delays::tx_delays;
use crate::normalize::NormalizedSequence;
use crate::request::ScanKind;
use crate::subtx::n_sub_tx;

/// The output of [`plan`] (spec §3 "Plan").
#[derive(Debug, Clone)]
pub struct Plan {
    /// `[nTx][128 * nOEM]`: outer index transmit, inner index physical TX
    /// channel lane.
    pub tx_ap_mask: Vec<Vec<bool>>,
    /// `[nTx][128 * nOEM]` seconds, row-extended and normalized.
    pub tx_del: Vec<Vec<f64>>,
    /// Seconds, length `nTx`. Identical across every transmit after
    /// normalization (the shared center-alignment target).
    pub tx_del_cent: Vec<f64>,
    pub n_sub_tx: usize,
    /// LIN only: the first physical element index of the RX aperture for
    /// each transmit.
    pub rx_ap_orig: Option<Vec<i64>>,
}

/// Fixed RX aperture width in elements for a STA/PWI-style full-aperture
/// receive, before any sub-transmit partitioning (spec §4.4).
pub fn rx_aperture_size(probe: &ProbeAdapterModel) -> f64 {
    match probe.adapter_tag() {
        usq_core::AdapterTag::Packed => 32.0,
        usq_core::AdapterTag::Interleaved => 32.0 * probe.n_oem() as f64,
    }
}

/// Builds a [`Plan`] from a [`NormalizedSequence`] and the probe/adapter
/// model (spec §4.3).
pub fn plan(kind: ScanKind, normalized: &NormalizedSequence, probe: &ProbeAdapterModel) -> Plan {
    let n_elem = probe.n_elem();
    let n_tx = normalized.n_tx;
    let n_channels = 128 * probe.n_oem();

    let mask = tx_aperture_mask(&normalized.tx_ap_cent, &normalized.tx_ap_size, probe);
    let raw = tx_delays(&normalized.tx_ap_cent, &normalized.tx_focus, &normalized.tx_angle, normalized.speed_of_sound, probe);

    // Stage 1: shift each column so its in-aperture minimum is 0.
    let mut shifted = raw.tx_del.clone();
    let mut centered0 = vec![0.0; n_tx];
    for t in 0..n_tx {
        let column_min = (0..n_elem)
            .filter(|&e| mask[t][e])
            .map(|e| raw.tx_del[t][e])
            .fold(f64::INFINITY, f64::min);
        let column_min = if column_min.is_finite() { column_min } else { 0.0 };
        for e in 0..n_elem {
            if mask[t][e] {
                shifted[t][e] -= column_min;
            }
        }
        centered0[t] = raw.center[t] - column_min;
    }

    // Stage 2: shift every column so its aperture-center delay equals the
    // largest pre-normalized center across all transmits.
    let target = centered0.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let target = if target.is_finite() { target } else { 0.0 };

    let mut tx_del = vec![vec![0.0; n_channels]; n_tx];
    let mut tx_ap_mask = vec![vec![false; n_channels]; n_tx];
    let tx_del_cent = vec![target; n_tx];

    for t in 0..n_tx {
        let offset = target - centered0[t];
        for e in 0..n_elem {
            if mask[t][e] {
                tx_ap_mask[t][e] = true;
                tx_del[t][e] = shifted[t][e] + offset;
            }
        }
        // Row extension: channels n_elem..n_channels stay false/0.0, already
        // the `vec!` default.
    }

    let n_sub_tx = n_sub_tx(kind, probe);

    let rx_ap_orig = if kind == ScanKind::Lin {
        let rx_ap_size = rx_aperture_size(probe);
        let elem_indices: Vec<f64> = (0..n_elem).map(|i| i as f64).collect();
        let max_orig = n_elem as i64 - rx_ap_size as i64;
        Some(
            normalized
                .tx_ap_cent
                .iter()
                .map(|&cent| {
                    let rx_cent_elem = interp_xy(probe.x_elem(), &elem_indices, cent);
                    let orig = (rx_cent_elem - (rx_ap_size - 1.0) / 2.0).round() as i64;
                    // Holds the window fully inside [0, nElem) — spec §8 scenario 3's
                    // worked example requires edge transmits to clamp to the array
                    // boundary rather than truncate the aperture width.
                    orig.clamp(0, max_orig)
                })
                .collect(),
        )
    } else {
        None
    };

    Plan {
        tx_ap_mask,
        tx_del,
        tx_del_cent,
        n_sub_tx,
        rx_ap_orig,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usq_core::{AdapterTag, NullObserver};

    use crate::normalize::normalize;
    use crate::request::{ApertureSize, ScanRequestBuilder};

    fn probe() -> ProbeAdapterModel {
        ProbeAdapterModel::new(192, 0.3e-3, 2, AdapterTag::Packed).unwrap()
    }

    #[test]
    fn tx_del_min_is_zero_for_the_dominant_transmit() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .build_lin(vec![96.0], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        let p = plan(ScanKind::Lin, &norm, &probe);
        let active_min = p.tx_ap_mask[0]
            .iter()
            .zip(p.tx_del[0].iter())
            .filter(|(&active, _)| active)
            .map(|(_, &d)| d)
            .fold(f64::INFINITY, f64::min);
        assert!(active_min.abs() < 1e-9);
    }

    #[test]
    fn tx_del_cent_is_uniform_across_transmits() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .build_lin(vec![50.0, 96.0, 140.0], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        let p = plan(ScanKind::Lin, &norm, &probe);
        let first = p.tx_del_cent[0];
        assert!(p.tx_del_cent.iter().all(|&v| (v - first).abs() < 1e-12));
    }

    #[test]
    fn row_extension_pads_beyond_n_elem_with_inactive_channels() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .build_lin(vec![96.0], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        let p = plan(ScanKind::Lin, &norm, &probe);
        assert_eq!(p.tx_ap_mask[0].len(), 256);
        for c in probe.n_elem()..256 {
            assert!(!p.tx_ap_mask[0][c]);
            assert_eq!(p.tx_del[0][c], 0.0);
        }
    }

    #[test]
    fn lin_rx_ap_orig_is_present_and_sta_is_not() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .build_lin(vec![96.0], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        let lin_plan = plan(ScanKind::Lin, &norm, &probe);
        assert!(lin_plan.rx_ap_orig.is_some());

        let req_sta = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .build_sta(vec![-0.01, 0.0, 0.01], ApertureSize::Scalar(1.0), f64::INFINITY, 0.0);
        let norm_sta = normalize(&req_sta, &probe, &NullObserver).unwrap();
        let sta_plan = plan(ScanKind::Sta, &norm_sta, &probe);
        assert!(sta_plan.rx_ap_orig.is_none());
    }

    #[test]
    fn rx_ap_orig_clamps_to_stay_inside_the_element_range() {
        // Edge transmits (aperture center at the first/last element) would
        // otherwise produce an unclamped rx_ap_orig outside [0, nElem), which
        // truncates the RX aperture to fewer than 32 elements instead of
        // sliding the window to hug the array boundary (spec §8 scenario 3).
        let probe = probe(); // 192 elements
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .build_lin(vec![0.0, 191.0], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        let p = plan(ScanKind::Lin, &norm, &probe);
        let rx_ap_orig = p.rx_ap_orig.unwrap();
        let max_orig = probe.n_elem() as i64 - 32;
        assert_eq!(rx_ap_orig[0], 0);
        assert_eq!(rx_ap_orig[1], max_orig);
        for &orig in &rx_ap_orig {
            assert!((0..=max_orig).contains(&orig));
        }
    }

    #[test]
    fn n_sub_tx_matches_scan_kind() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .build_lin(vec![96.0], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        assert_eq!(plan(ScanKind::Lin, &norm, &probe).n_sub_tx, 1);
    }
}
