//! TX delay profiles: plane-wave and point-source/focused (spec §4.3
//! "Delays").

use usq_core::math::Real;
use usq_core::ProbeAdapterModel;

/// Per-element, per-transmit raw delay in seconds (`[nTx][nElem]`) together
/// with the raw delay at the nominal aperture center, before aperture
/// masking or the two normalization shifts in [`crate::plan`].
pub struct RawDelays {
    pub tx_del: Vec<Vec<f64>>,
    pub center: Vec<f64>,
}

/// Computes raw TX delays for every transmit (spec §4.3 "Delays").
///
/// `tx_focus[t] == +inf` selects the plane-wave formula; any finite value
/// selects the point-source formula, with the defocus sign flip applied
/// when the virtual source lies behind the array (`zF < 0`).
pub fn tx_delays(tx_ap_cent: &[f64], tx_focus: &[f64], tx_angle: &[f64], speed_of_sound: f64, probe: &ProbeAdapterModel) -> RawDelays {
    let x_elem = probe.x_elem();
    let n_tx = tx_ap_cent.len();
    let mut tx_del = Vec::with_capacity(n_tx);
    let mut center = Vec::with_capacity(n_tx);

    for t in 0..n_tx {
        let cent = tx_ap_cent[t];
        let focus = tx_focus[t];
        let theta = tx_angle[t];

        if focus.is_infinite() && focus > 0.0 {
            let sin_theta = theta.sin();
            let column: Vec<f64> = x_elem.iter().map(|&x| x * sin_theta / speed_of_sound).collect();
            center.push(cent * sin_theta / speed_of_sound);
            tx_del.push(column);
        } else {
            let x_f = focus * theta.sin() + cent;
            let z_f = focus * theta.cos();
            // focDefoc = 1 - 2*max(0, sign(zF)): -1 when the virtual source is
            // ahead of the array (zF > 0, normal convergent focus, so the raw
            // distance/c is negated before the min-shift turns the farthest
            // element into the zero-delay reference); +1 when zF <= 0 (behind
            // the array, diverging), leaving the nearest element at zero delay.
            let foc_defoc = if z_f > 0.0 { -1.0 } else { 1.0 };

            let column: Vec<f64> = x_elem
                .iter()
                .map(|&x| {
                    let dx = x_f - x;
                    ((dx * dx + z_f * z_f).sqrt() / speed_of_sound) * foc_defoc
                })
                .collect();
            let dx_cent = x_f - cent;
            center.push(((dx_cent * dx_cent + z_f * z_f).sqrt() / speed_of_sound) * foc_defoc);
            tx_del.push(column);
        }
    }

    RawDelays { tx_del, center }
}
