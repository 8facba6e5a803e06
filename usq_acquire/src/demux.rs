//! Reshape, permute, and LIN-mode alignment (spec §4.5 "Reshape" / "LIN-mode
//! alignment").
//!
//! The raw per-OEM buffer is interpreted as the 6-D array
//! `[32, nSamp, nSubTx, nTx, nRep, nOEM]` in column-major order (first axis
//! fastest), matching the order `ScheduleReceive` lays triggers out in and
//! the order OEMs are concatenated in by `TransferAllRXBuffersToHost`. This
//! module never materializes that 6-D array: it computes, for every output
//! tensor cell, the one raw sample it corresponds to.

use usq_core::AdapterTag;
use usq_dsp::ScanKind;
use usq_hw::ProgrammedSequence;

use crate::tensor::RfTensor;

/// Decomposes a combined-channel index (post physical-channel permutation,
/// pre LIN shift/slice) into its `(channel, sub_tx, oem)` parts, inverting
/// whichever of the two permutations (spec §4.5 "Reshape") the adapter
/// calls for.
fn decompose_combined_channel(adapter: AdapterTag, combined: usize, n_sub_tx: usize, n_oem: usize) -> (usize, usize, usize) {
    let channel = combined % 32;
    let rest = combined / 32;
    match adapter {
        // Type-0 permutation [2,1,3,6,4,5]: combined = ch + 32*(subTx + nSubTx*oem).
        AdapterTag::Packed => (channel, rest % n_sub_tx, rest / n_sub_tx),
        // Type-1 permutation [2,1,6,3,4,5]: combined = ch + 32*(oem + nOEM*subTx).
        AdapterTag::Interleaved => (channel, rest / n_oem, rest % n_oem),
    }
}

/// Builds the 32-entry map from final LIN output channel to combined-axis
/// index for one transmit's `rx_ap_orig` (spec §4.5 "LIN-mode alignment").
///
/// `rx_ap_orig` here is already 0-indexed (see [`usq_dsp::plan`]), so it is
/// exactly `rxApOrig[t] - 1` in the 1-indexed hardware convention (spec §3).
fn lin_channel_map(adapter: AdapterTag, rx_ap_orig: i64, n_sub_tx: usize, n_oem: usize) -> [usize; 32] {
    let combined_len = (32 * n_sub_tx * n_oem) as i64;
    let mut map = [0usize; 32];
    match adapter {
        AdapterTag::Packed => {
            let coarse = (rx_ap_orig - 32 * 3).clamp(0, 32);
            // Spec §9 open question 2: this guard skips the fine shift when
            // rxApOrig falls in the last 32-wide sub-aperture block; kept
            // verbatim from spec §4.5 rather than re-derived. Spec's guard is
            // 1-indexed (1+32*3, 1+32*4] = (97, 129]; in this file's 0-indexed
            // convention (rx_ap_orig = rxApOrig - 1) that is (96, 128].
            let skip_fine = rx_ap_orig > 32 * 3 && rx_ap_orig <= 32 * 4;
            for (i, slot) in map.iter_mut().enumerate() {
                let combined = if skip_fine {
                    i as i64 + coarse
                } else {
                    let fine = rx_ap_orig.rem_euclid(32);
                    (i as i64 + fine).rem_euclid(32) + coarse
                };
                *slot = combined.rem_euclid(combined_len) as usize;
            }
        }
        AdapterTag::Interleaved => {
            let shift = rx_ap_orig.rem_euclid(32 * n_oem as i64);
            for (i, slot) in map.iter_mut().enumerate() {
                *slot = (i as i64 + shift).rem_euclid(combined_len) as usize;
            }
        }
    }
    map
}

/// Reshapes/permutes/aligns `raw` (one flat buffer per
/// [`usq_driver::OemDriver::transfer_all_rx_buffers_to_host`]) into the
/// canonical RF tensor (spec §4.5).
///
/// `raw.len()` must equal `n_oem * 32 * n_samp * n_trig`.
pub fn demultiplex(kind: ScanKind, adapter: AdapterTag, n_oem: usize, n_elem: usize, programmed: &ProgrammedSequence, raw: &[i16]) -> RfTensor {
    let n_samp = programmed.n_samp as usize;
    let n_sub_tx = programmed.n_sub_tx;
    let n_tx = programmed.n_tx;
    let n_rep = programmed.n_rep as usize;
    let n_trig_per_oem = n_sub_tx * n_tx * n_rep;
    debug_assert_eq!(n_trig_per_oem, programmed.n_trig);
    debug_assert_eq!(raw.len(), n_oem * 32 * n_samp * n_trig_per_oem);

    let combined_channels = 32 * n_sub_tx * n_oem;
    let n_channels = match kind {
        ScanKind::Lin => 32,
        ScanKind::Sta | ScanKind::Pwi => n_elem.min(combined_channels),
    };

    let mut out = RfTensor::zeros(n_samp, n_channels, n_tx, n_rep);
    let oem_block_len = 32 * n_samp * n_trig_per_oem;

    for tx in 0..n_tx {
        let lin_map = match kind {
            ScanKind::Lin => {
                let rx_ap_orig = programmed.rx_ap_orig.as_ref().expect("LIN schedule always carries rx_ap_orig")[tx];
                Some(lin_channel_map(adapter, rx_ap_orig, n_sub_tx, n_oem))
            }
            ScanKind::Sta | ScanKind::Pwi => None,
        };

        for c_out in 0..n_channels {
            let combined = match &lin_map {
                Some(map) => map[c_out],
                None => c_out,
            };
            let (channel, sub_tx, oem) = decompose_combined_channel(adapter, combined, n_sub_tx, n_oem);

            for rep in 0..n_rep {
                // Trigger order within an OEM's block: sub-transmit fastest,
                // then transmit, then repetition (spec §5 "Ordering
                // guarantee").
                let trigger_in_oem = sub_tx + n_sub_tx * (tx + n_tx * rep);
                let oem_base = oem * oem_block_len + 32 * n_samp * trigger_in_oem;
                for samp in 0..n_samp {
                    let flat = oem_base + channel + 32 * samp;
                    out.set(samp, c_out, tx, rep, raw[flat]);
                }
            }
        }
    }

    out
}
