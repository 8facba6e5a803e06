//! C2 — Sequence Normalizer (spec §4.2).
//!
//! Resolves a caller-facing [`ScanRequest`] plus a [`ProbeAdapterModel`]
//! into a [`NormalizedSequence`]: derived scalars and uniform
//! length-`nTx` vectors that the planner (C3) and hardware programmer (C4)
//! can consume without re-deriving anything from the request.

use usq_core::{Observer, ProbeAdapterModel, Result, UsqError};

use crate::request::{RxWindow, ScanRequest};
use crate::tgc::build_tgc_curve;

/// Hardware DMA transfer granularity (spec §3 invariant 1).
const SAMPLE_GRANULARITY: i64 = 64;
/// Maximum samples per OEM firing (spec §3 invariant 5), before dividing by
/// `fsDivider`.
const MAX_RAW_SAMPLES: i64 = 1 << 13;

/// The normalized form of a [`ScanRequest`] (spec §3 "Normalized sequence").
#[derive(Debug, Clone)]
pub struct NormalizedSequence {
    pub rx_samp_freq: f64,
    /// 1-indexed start sample of the record window within the ADC stream.
    pub start_sample: i64,
    pub n_samp: i64,
    pub n_tx: usize,
    /// Meters, length `n_tx`.
    pub tx_ap_cent: Vec<f64>,
    /// Elements, length `n_tx`.
    pub tx_ap_size: Vec<f64>,
    /// Meters; `+inf` for plane wave. Length `n_tx`.
    pub tx_focus: Vec<f64>,
    /// Radians, length `n_tx`.
    pub tx_angle: Vec<f64>,
    pub speed_of_sound: f64,
    pub tx_frequency: f64,
    pub tx_n_periods: u32,
    pub tx_pri: f64,
    pub n_repetitions: crate::request::Repetitions,
    pub fs_divider: u32,
    /// Normalized `[0, 1]`, produced by [`build_tgc_curve`].
    pub tgc_curve: Vec<f64>,
}

/// Normalizes `request` against `probe` (spec §4.2 steps 1-6).
pub fn normalize(request: &ScanRequest, probe: &ProbeAdapterModel, observer: &dyn Observer) -> Result<NormalizedSequence> {
    if request.fs_divider == 0 {
        return Err(UsqError::illegal_argument("fsDivider must be >= 1"));
    }
    if request.speed_of_sound <= 0.0 || !request.speed_of_sound.is_finite() {
        return Err(UsqError::illegal_argument("speedOfSound must be a positive, finite value"));
    }

    // Step 1.
    let rx_samp_freq = 65e6 / request.fs_divider as f64;

    // Step 2.
    let (start_sample, n_samp) = match request.rx_window {
        RxWindow::DepthRange { z_min, z_max } => {
            let s0 = round_i64(2.0 * rx_samp_freq * z_min / request.speed_of_sound) + 1;
            let s1 = round_i64(2.0 * rx_samp_freq * z_max / request.speed_of_sound) + 1;
            let raw_n_samp = s1 - s0 + 1;
            if raw_n_samp <= 0 {
                return Err(UsqError::illegal_argument("rxDepthRange must have zMax > zMin"));
            }
            let rounded = round_up_to_multiple(raw_n_samp, SAMPLE_GRANULARITY);
            (s0, rounded)
        }
        RxWindow::SampleRange { first_sample, last_sample } => {
            let n_samp = last_sample - first_sample + 1;
            if n_samp <= 0 {
                return Err(UsqError::illegal_argument("rxNSamples must have lastSample >= firstSample"));
            }
            (first_sample, n_samp)
        }
    };

    if n_samp % SAMPLE_GRANULARITY != 0 {
        return Err(UsqError::illegal_argument(format!("nSamp ({n_samp}) must be a multiple of {SAMPLE_GRANULARITY}")));
    }
    let max_samp = MAX_RAW_SAMPLES / request.fs_divider as i64;
    if n_samp > max_samp {
        return Err(UsqError::illegal_argument(format!("nSamp ({n_samp}) exceeds the {max_samp}-sample limit for fsDivider = {}", request.fs_divider)));
    }

    // Step 4 (computed before step 3 since aperture broadcasting needs it).
    let n_tx = request.n_tx()?;

    // Step 3.
    let tx_ap_cent: Vec<f64> = match &request.tx_aperture_position {
        crate::request::TxAperturePosition::ApertureCenter(v) => v.clone(),
        crate::request::TxAperturePosition::CenterElement(v) => v.iter().map(|&idx| probe.interp_element_position(idx)).collect(),
    };
    if tx_ap_cent.len() != n_tx {
        return Err(UsqError::illegal_argument(format!("tx aperture position has {} entries, expected nTx = {n_tx}", tx_ap_cent.len())));
    }

    let tx_ap_size = request.tx_aperture_size_vec(n_tx)?;
    let tx_focus = ScanRequest::broadcast(&request.tx_focus, n_tx, "txFocus")?;
    let tx_angle = ScanRequest::broadcast(&request.tx_angle, n_tx, "txAngle")?;

    // Step 5.
    let tgc_curve = build_tgc_curve(request.tgc_start, request.tgc_slope, request.fs_divider, rx_samp_freq, request.speed_of_sound, start_sample, n_samp, observer);

    Ok(NormalizedSequence {
        rx_samp_freq,
        start_sample,
        n_samp,
        n_tx,
        tx_ap_cent,
        tx_ap_size,
        tx_focus,
        tx_angle,
        speed_of_sound: request.speed_of_sound,
        tx_frequency: request.tx_frequency,
        tx_n_periods: request.tx_n_periods,
        tx_pri: request.tx_pri,
        n_repetitions: request.n_repetitions,
        fs_divider: request.fs_divider,
        tgc_curve,
    })
}

fn round_i64(x: f64) -> i64 {
    x.round() as i64
}

fn round_up_to_multiple(n: i64, multiple: i64) -> i64 {
    ((n + multiple - 1) / multiple) * multiple
}

#[cfg(test)]
mod tests {
    use super::*;
    use usq_core::{AdapterTag, NullObserver, ProbeAdapterModel};

    use crate::request::{ApertureSize, Repetitions, ScanRequestBuilder};

    fn probe() -> ProbeAdapterModel {
        ProbeAdapterModel::new(192, 0.3e-3, 2, AdapterTag::Packed).unwrap()
    }

    #[test]
    fn depth_range_rounds_n_samp_up_to_64() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.050)
            .build_lin(vec![96.0], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        assert_eq!(norm.start_sample, 1);
        assert_eq!(norm.n_samp, 4544);
        assert_eq!(norm.n_samp % 64, 0);
    }

    #[test]
    fn explicit_sample_range_is_used_verbatim() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_n_samples(1, 1024)
            .build_lin(vec![96.0], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        assert_eq!(norm.start_sample, 1);
        assert_eq!(norm.n_samp, 1024);
    }

    #[test]
    fn rejects_sample_count_not_multiple_of_64() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_n_samples(1, 1000)
            .build_lin(vec![96.0], ApertureSize::Scalar(32.0), 0.02);
        assert!(normalize(&req, &probe, &NullObserver).is_err());
    }

    #[test]
    fn center_element_resolves_through_probe_geometry() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .build_lin(vec![95.5], ApertureSize::Scalar(32.0), 0.02);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        let expected = probe.interp_element_position(95.5);
        assert!((norm.tx_ap_cent[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn n_tx_matches_aperture_center_count_for_sta() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_depth_range(0.0, 0.02)
            .n_repetitions(Repetitions::Count(4))
            .build_sta(vec![-0.01, 0.0, 0.01], ApertureSize::Scalar(1.0), f64::INFINITY, 0.0);
        let norm = normalize(&req, &probe, &NullObserver).unwrap();
        assert_eq!(norm.n_tx, 3);
        assert_eq!(norm.tx_focus, vec![f64::INFINITY; 3]);
    }

    #[test]
    fn rejects_excessive_sample_count_for_fs_divider() {
        let probe = probe();
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2)
            .rx_n_samples(1, 8192 + 64)
            .build_lin(vec![96.0], ApertureSize::Scalar(32.0), 0.02);
        assert!(normalize(&req, &probe, &NullObserver).is_err());
    }
}
