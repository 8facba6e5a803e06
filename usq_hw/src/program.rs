//! C4 — the actual lowering pass: turns a [`Plan`] + [`NormalizedSequence`]
//! into driver calls (spec §4.4), validating the `nFire`/`nTrig`/memory
//! invariants (spec §3 invariants 2-4) that can only be known once the
//! sub-transmit count and resolved repetition count are in hand.

use serde::{Deserialize, Serialize};

use usq_core::mask::encode_bits;
use usq_core::{ProbeAdapterModel, Result, UsqError};
use usq_dsp::{NormalizedSequence, Plan, Repetitions, ScanKind};

use usq_driver::OemDriver;

use crate::schedule::{active_channel_group_mask, rx_aperture_mask, rx_sub_aperture_mask};

/// Instruction-memory cap: at most this many firings per OEM (spec §3
/// invariant 2).
pub const MAX_N_FIRE: usize = 1024;
/// Trigger-table capacity (spec §3 invariant 3).
pub const MAX_N_TRIG: usize = 16_384;
/// Per-OEM DDR budget in bytes (spec §3 invariant 4): 4 GiB.
pub const MAX_OEM_BYTES: u64 = 1 << 32;

/// Fixed analog RX gate open time per firing (spec §4.4 `SetRxTime`).
pub const RX_TIME_S: f64 = 160e-6;
/// Fixed analog RX gate delay per firing (spec §4.4 `SetRxDelay`).
pub const RX_DELAY_S: f64 = 5e-6;
/// Fixed hardware pipeline delay added to every scheduled receive's start
/// sample (spec §4.4 "Scheduled receive").
pub const PIPELINE_DELAY_SAMPLES: i64 = 240;

/// The resolved, hardware-facing shape of a programmed sequence: everything
/// [`crate::program`] derived beyond the [`Plan`] that [`usq_acquire`]'s
/// demultiplexer needs to reconstruct the canonical RF tensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgrammedSequence {
    pub kind: ScanKind,
    pub n_tx: usize,
    pub n_sub_tx: usize,
    /// Resolved from [`Repetitions::Max`] if the request used the sentinel.
    pub n_rep: u32,
    pub n_fire: usize,
    pub n_trig: usize,
    pub n_samp: i64,
    pub start_sample: i64,
    pub fs_divider: u32,
    pub tx_pri: f64,
    /// LIN only: first physical element index of the RX aperture per
    /// transmit, carried through from the [`Plan`].
    pub rx_ap_orig: Option<Vec<i64>>,
}

/// Resolves [`Repetitions::Max`] to the largest repetition count that keeps
/// `nTrig = nFire * nRep` within [`MAX_N_TRIG`].
fn resolve_n_rep(n_repetitions: Repetitions, n_fire: usize) -> Result<u32> {
    match n_repetitions {
        Repetitions::Count(n) => {
            if n == 0 {
                return Err(UsqError::illegal_argument("nRepetitions must be >= 1"));
            }
            Ok(n)
        }
        Repetitions::Max => Ok((MAX_N_TRIG / n_fire) as u32),
    }
}

/// Programs every OEM's instruction memory, the OEM-0 trigger table, and
/// every OEM's scheduled-receive table for the transmits in `plan` (spec
/// §4.4). Returns the derived schedule shape that the demultiplexer needs.
pub fn program(kind: ScanKind, plan: &Plan, normalized: &NormalizedSequence, probe: &ProbeAdapterModel, driver: &dyn OemDriver) -> Result<ProgrammedSequence> {
    let n_tx = normalized.n_tx;
    let n_sub_tx = plan.n_sub_tx;
    let n_fire = n_tx * n_sub_tx;

    if n_fire > MAX_N_FIRE {
        return Err(UsqError::illegal_argument(format!("nFire ({n_fire}) exceeds instruction memory capacity ({MAX_N_FIRE})")));
    }

    let n_rep = resolve_n_rep(normalized.n_repetitions, n_fire)?;
    let n_trig = n_fire * n_rep as usize;
    if n_trig > MAX_N_TRIG {
        return Err(UsqError::illegal_argument(format!("nTrig ({n_trig}) exceeds trigger-table capacity ({MAX_N_TRIG})")));
    }

    let bytes_per_oem = 32u64 * normalized.n_samp as u64 * 2 * n_trig as u64;
    if bytes_per_oem > MAX_OEM_BYTES {
        return Err(UsqError::out_of_memory(format!("{bytes_per_oem} bytes per OEM exceeds the 4 GiB DDR budget")));
    }

    let n_oem = probe.n_oem();
    let rx_ap_masks: Vec<Vec<bool>> = (0..n_tx).map(|t| rx_aperture_mask(kind, plan, probe, t)).collect();

    for oem in 0..n_oem {
        let group_mask_hex = encode_bits(&active_channel_group_mask(probe, oem));

        for f in 0..n_fire {
            let t = f / n_sub_tx;
            let s = f % n_sub_tx;

            let mut tx_mask = [false; 128];
            let mut tx_delays = vec![0.0f64; 128];
            for c in 0..128 {
                let elem = probe.select_elem(c, oem);
                if probe.is_active_channel(c, oem) && elem < plan.tx_ap_mask[t].len() && plan.tx_ap_mask[t][elem] {
                    tx_mask[c] = true;
                    tx_delays[c] = plan.tx_del[t][elem];
                }
            }
            driver.set_tx_aperture(oem, &encode_bits(&tx_mask), f)?;
            driver.set_tx_delays(oem, &tx_delays, f)?;
            driver.set_tx_frequency(oem, normalized.tx_frequency, f)?;
            driver.set_tx_half_periods(oem, 2 * normalized.tx_n_periods, f)?;
            driver.set_tx_invert(oem, false, f)?;

            driver.set_active_channel_group(oem, &group_mask_hex, f)?;

            let rx_sub_mask = rx_sub_aperture_mask(probe, &rx_ap_masks[t], oem, s);
            driver.set_rx_aperture(oem, &encode_bits(&rx_sub_mask), f)?;
            driver.set_rx_time(oem, RX_TIME_S, f)?;
            driver.set_rx_delay(oem, RX_DELAY_S, f)?;
            driver.tgc_set_samples(oem, &normalized.tgc_curve, f)?;
        }

        driver.set_number_of_firings(oem, n_fire)?;
        driver.enable_transmit(oem)?;
        driver.enable_receive(oem)?;
    }

    driver.set_n_triggers(n_trig)?;
    for i in 0..n_trig {
        let sync_out = i == n_trig - 1;
        driver.set_trigger(normalized.tx_pri, false, sync_out, i)?;
    }

    for oem in 0..n_oem {
        driver.clear_scheduled_receive(oem)?;
        for i in 0..n_trig {
            driver.schedule_receive(oem, i * normalized.n_samp as usize, normalized.n_samp as usize, normalized.fs_divider - 1, normalized.start_sample + PIPELINE_DELAY_SAMPLES)?;
        }
    }

    Ok(ProgrammedSequence {
        kind,
        n_tx,
        n_sub_tx,
        n_rep,
        n_fire,
        n_trig,
        n_samp: normalized.n_samp,
        start_sample: normalized.start_sample,
        fs_divider: normalized.fs_divider,
        tx_pri: normalized.tx_pri,
        rx_ap_orig: plan.rx_ap_orig.clone(),
    })
}
