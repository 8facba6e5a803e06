//! TX aperture mask (spec §4.3 "Aperture mask").

use usq_core::ProbeAdapterModel;

/// `txApMask[e][t] = |x[e] - txApCent[t]| <= ((txApSize[t] - 1) / 2) * pitch`.
///
/// Returns a `[nTx][nElem]` matrix (outer index transmit, inner index
/// element) restricted to the physical elements; row extension to the full
/// `128 * nOEM` channel space happens in [`crate::plan`].
pub fn tx_aperture_mask(tx_ap_cent: &[f64], tx_ap_size: &[f64], probe: &ProbeAdapterModel) -> Vec<Vec<bool>> {
    let x_elem = probe.x_elem();
    let pitch = probe.pitch();
    tx_ap_cent
        .iter()
        .zip(tx_ap_size.iter())
        .map(|(&cent, &size)| {
            let half_width = ((size - 1.0) / 2.0) * pitch;
            x_elem.iter().map(|&x| (x - cent).abs() <= half_width).collect()
        })
        .collect()
}
