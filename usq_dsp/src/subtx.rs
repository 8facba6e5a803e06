//! Sub-transmit count (spec §4.3 "Sub-transmits").
//!
//! `nSubTx` is the number of physical RX apertures needed to cover the
//! logical RX aperture without any OEM RX channel (`mod 32`) being asserted
//! twice within a single sub-transmit.

use usq_core::{AdapterTag, ProbeAdapterModel};

use crate::request::ScanKind;

/// Computes `nSubTx` for a scan kind against a probe/adapter (spec §4.3).
pub fn n_sub_tx(kind: ScanKind, probe: &ProbeAdapterModel) -> usize {
    if kind == ScanKind::Lin {
        return 1;
    }
    let n_elem = probe.n_elem();
    let n_oem = probe.n_oem();
    match probe.adapter_tag() {
        AdapterTag::Packed => (div_ceil(n_elem, 32)).min(4),
        AdapterTag::Interleaved => div_ceil(n_elem.min(128), 32 * n_oem).min(4),
    }
}

fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}
