//! C2 input — the acquisition request a caller builds and hands to
//! [`crate::normalize::normalize`] (spec §3 "Sequence request").

use serde::{Deserialize, Serialize};

use usq_core::{Result, UsqError};

/// The three supported scan kinds (spec §3, §4.9 "Tagged scan kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanKind {
    /// Linear, per-line focused acquisition.
    Lin,
    /// Synthetic transmit aperture.
    Sta,
    /// Plane-wave imaging.
    Pwi,
}

/// How the TX aperture center is specified per transmit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TxAperturePosition {
    /// Fractional element index, length `nTx`.
    CenterElement(Vec<f64>),
    /// Meters from the array center, length `nTx`.
    ApertureCenter(Vec<f64>),
}

/// The TX aperture size in elements: either a single value shared by every
/// transmit or one value per transmit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApertureSize {
    Scalar(f64),
    PerTransmit(Vec<f64>),
}

impl ApertureSize {
    fn resolve(&self, n_tx: usize) -> Result<Vec<f64>> {
        match self {
            ApertureSize::Scalar(v) => Ok(vec![*v; n_tx]),
            ApertureSize::PerTransmit(v) => {
                if v.len() != n_tx {
                    return Err(UsqError::illegal_argument(format!(
                        "txApertureSize has {} entries, expected nTx = {n_tx}",
                        v.len()
                    )));
                }
                Ok(v.clone())
            }
        }
    }
}

/// The RX record window: either a depth range to be converted to samples, or
/// an explicit, 1-indexed inclusive sample range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RxWindow {
    DepthRange { z_min: f64, z_max: f64 },
    /// 1-indexed, inclusive sample bounds.
    SampleRange { first_sample: i64, last_sample: i64 },
}

/// The number of repetitions to program, or the `max` sentinel whose
/// concrete value depends on `nFire` (resolved once the plan is known, by
/// `usq_hw`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repetitions {
    Count(u32),
    Max,
}

/// A fully specified acquisition request (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub kind: ScanKind,
    pub tx_aperture_position: TxAperturePosition,
    pub tx_aperture_size: ApertureSize,
    /// Meters; `+inf` => plane wave; negative => diverging/virtual source
    /// behind the array. Broadcast to length `nTx` if a single value.
    pub tx_focus: Vec<f64>,
    /// Radians. For PWI, `nTx = tx_angle.len()`; broadcast to `nTx` for
    /// LIN/STA if a single value.
    pub tx_angle: Vec<f64>,
    pub speed_of_sound: f64,
    pub tx_frequency: f64,
    pub tx_n_periods: u32,
    pub rx_window: RxWindow,
    pub tx_pri: f64,
    pub n_repetitions: Repetitions,
    pub fs_divider: u32,
    pub tgc_start: f64,
    pub tgc_slope: f64,
}

impl ScanRequest {
    /// `nTx`: `|txApertureCenter|` for STA/LIN, `|txAngle|` for PWI (spec
    /// §4.2 step 4), after resolving whichever aperture-position variant was
    /// given.
    pub fn n_tx(&self) -> Result<usize> {
        match self.kind {
            ScanKind::Pwi => {
                if self.tx_angle.is_empty() {
                    return Err(UsqError::illegal_argument("PWI requires at least one txAngle"));
                }
                Ok(self.tx_angle.len())
            }
            ScanKind::Lin | ScanKind::Sta => {
                let n = match &self.tx_aperture_position {
                    TxAperturePosition::CenterElement(v) => v.len(),
                    TxAperturePosition::ApertureCenter(v) => v.len(),
                };
                if n == 0 {
                    return Err(UsqError::illegal_argument("LIN/STA requires at least one transmit aperture"));
                }
                Ok(n)
            }
        }
    }

    /// Broadcasts a possibly-scalar (length-1) per-transmit array to length
    /// `n_tx`, or validates an already-vectorized one.
    pub(crate) fn broadcast(values: &[f64], n_tx: usize, field: &str) -> Result<Vec<f64>> {
        match values.len() {
            0 => Err(UsqError::illegal_argument(format!("{field} must not be empty"))),
            1 => Ok(vec![values[0]; n_tx]),
            n if n == n_tx => Ok(values.to_vec()),
            n => Err(UsqError::illegal_argument(format!(
                "{field} has {n} entries, expected 1 or nTx = {n_tx}"
            ))),
        }
    }

    pub(crate) fn tx_aperture_size_vec(&self, n_tx: usize) -> Result<Vec<f64>> {
        self.tx_aperture_size.resolve(n_tx)
    }
}

/// Fluent constructor shared by the three scan-kind builders below: chains
/// optional setters one stage at a time, finishing with a `build_*` call
/// rather than requiring every `ScanRequest` field to be filled by hand.
#[derive(Debug, Clone)]
pub struct ScanRequestBuilder {
    speed_of_sound: f64,
    tx_frequency: f64,
    tx_n_periods: u32,
    rx_window: RxWindow,
    tx_pri: f64,
    n_repetitions: Repetitions,
    fs_divider: u32,
    tgc_start: f64,
    tgc_slope: f64,
}

impl ScanRequestBuilder {
    pub fn new(speed_of_sound: f64, tx_frequency: f64, tx_n_periods: u32) -> Self {
        Self {
            speed_of_sound,
            tx_frequency,
            tx_n_periods,
            rx_window: RxWindow::DepthRange { z_min: 0.0, z_max: 0.05 },
            tx_pri: 200e-6,
            n_repetitions: Repetitions::Count(1),
            fs_divider: 1,
            tgc_start: 14.0,
            tgc_slope: 0.0,
        }
    }

    pub fn rx_depth_range(mut self, z_min: f64, z_max: f64) -> Self {
        self.rx_window = RxWindow::DepthRange { z_min, z_max };
        self
    }

    pub fn rx_n_samples(mut self, first_sample: i64, last_sample: i64) -> Self {
        self.rx_window = RxWindow::SampleRange { first_sample, last_sample };
        self
    }

    pub fn tx_pri(mut self, tx_pri: f64) -> Self {
        self.tx_pri = tx_pri;
        self
    }

    pub fn n_repetitions(mut self, n_repetitions: Repetitions) -> Self {
        self.n_repetitions = n_repetitions;
        self
    }

    pub fn fs_divider(mut self, fs_divider: u32) -> Self {
        self.fs_divider = fs_divider;
        self
    }

    pub fn tgc(mut self, start_db: f64, slope_db_per_m: f64) -> Self {
        self.tgc_start = start_db;
        self.tgc_slope = slope_db_per_m;
        self
    }

    fn base_request(&self, kind: ScanKind, tx_aperture_position: TxAperturePosition, tx_aperture_size: ApertureSize, tx_focus: Vec<f64>, tx_angle: Vec<f64>) -> ScanRequest {
        ScanRequest {
            kind,
            tx_aperture_position,
            tx_aperture_size,
            tx_focus,
            tx_angle,
            speed_of_sound: self.speed_of_sound,
            tx_frequency: self.tx_frequency,
            tx_n_periods: self.tx_n_periods,
            rx_window: self.rx_window,
            tx_pri: self.tx_pri,
            n_repetitions: self.n_repetitions,
            fs_divider: self.fs_divider,
            tgc_start: self.tgc_start,
            tgc_slope: self.tgc_slope,
        }
    }

    /// Builds a LIN request: one focused line per entry in
    /// `tx_center_elements`.
    pub fn build_lin(self, tx_center_elements: Vec<f64>, tx_aperture_size: ApertureSize, tx_focus: f64) -> ScanRequest {
        let n_tx = tx_center_elements.len();
        self.base_request(
            ScanKind::Lin,
            TxAperturePosition::CenterElement(tx_center_elements),
            tx_aperture_size,
            vec![tx_focus; n_tx],
            vec![0.0; n_tx],
        )
    }

    /// Builds an STA request: one (possibly small) transmit aperture per
    /// entry in `tx_aperture_centers`.
    pub fn build_sta(self, tx_aperture_centers: Vec<f64>, tx_aperture_size: ApertureSize, tx_focus: f64, tx_angle: f64) -> ScanRequest {
        let n_tx = tx_aperture_centers.len();
        self.base_request(
            ScanKind::Sta,
            TxAperturePosition::ApertureCenter(tx_aperture_centers),
            tx_aperture_size,
            vec![tx_focus; n_tx],
            vec![tx_angle; n_tx],
        )
    }

    /// Builds a PWI request: one unfocused, tilted wavefront per entry in
    /// `tx_angle`, sharing a single full-width aperture centered at
    /// `tx_aperture_center` (meters).
    pub fn build_pwi(self, tx_angle: Vec<f64>, tx_aperture_center: f64, tx_aperture_size: f64) -> ScanRequest {
        let n_tx = tx_angle.len();
        self.base_request(
            ScanKind::Pwi,
            TxAperturePosition::ApertureCenter(vec![tx_aperture_center; n_tx]),
            ApertureSize::Scalar(tx_aperture_size),
            vec![f64::INFINITY; n_tx],
            tx_angle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_tx_for_lin_matches_center_element_length() {
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2).build_lin(vec![1.0, 2.0, 3.0], ApertureSize::Scalar(32.0), 0.02);
        assert_eq!(req.n_tx().unwrap(), 3);
    }

    #[test]
    fn n_tx_for_pwi_matches_angle_length() {
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2).build_pwi(vec![0.0, 0.1, -0.1, 0.2], 0.0, 0.02);
        assert_eq!(req.n_tx().unwrap(), 4);
    }

    #[test]
    fn per_transmit_aperture_size_must_match_n_tx() {
        let req = ScanRequestBuilder::new(1450.0, 5e6, 2).build_lin(vec![1.0, 2.0], ApertureSize::PerTransmit(vec![32.0, 32.0, 32.0]), 0.02);
        assert!(req.tx_aperture_size_vec(2).is_err());
    }

    #[test]
    fn broadcast_expands_single_value() {
        let v = ScanRequest::broadcast(&[0.0], 5, "txAngle").unwrap();
        assert_eq!(v, vec![0.0; 5]);
    }

    #[test]
    fn broadcast_rejects_mismatched_length() {
        assert!(ScanRequest::broadcast(&[0.0, 1.0, 2.0], 5, "txAngle").is_err());
    }
}
