//! C1 — Probe & Adapter Model.
//!
//! Holds element geometry and the adapter wiring topology that connects a
//! physical transducer array to `nOEM` front-end modules. Immutable once
//! built; every other component (sequence normalization, planning, hardware
//! programming, demultiplexing) treats a [`ProbeAdapterModel`] as read-only
//! shared context.
//!
//! Indices in this module are always 0-based: an element index `e` ranges
//! over `0..n_elem`, a logical hardware channel `c` over `0..128` (TX) or
//! `0..32` (RX). Spec §3's `c ∈ [1..128]` 1-based numbering is a hardware
//! documentation convention; the formulas below are its 0-based equivalent.

use serde::{Deserialize, Serialize};

use crate::error::{Result, UsqError};

pub const TX_CHANNELS_PER_OEM: usize = 128;
pub const RX_CHANNELS_PER_OEM: usize = 32;

/// The adapter wiring variant between OEM physical channels and probe
/// elements (spec §3 "Adapter topology").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterTag {
    /// "Packed" (00001111): element `e` is served by OEM `e / 128`, logical
    /// channel `e % 128`.
    Packed,
    /// "Interleaved" (01010101): every OEM sees all 128 logical channels,
    /// but only a strided subset is active per OEM.
    Interleaved,
}

impl AdapterTag {
    /// `selectElem[c, k]`: the element index a logical channel `c` on OEM
    /// `k` is wired to, independent of whether that wiring is active for the
    /// current probe (see [`AdapterTag::is_active`]).
    #[inline]
    pub fn select_elem(self, channel: usize, oem: usize) -> usize {
        match self {
            AdapterTag::Packed => channel + TX_CHANNELS_PER_OEM * oem,
            AdapterTag::Interleaved => channel,
        }
    }

    /// `actChan[c, k]`: whether physical channel `c` on OEM `k` is wired to
    /// a real element of a probe with `n_elem` elements.
    #[inline]
    pub fn is_active(self, channel: usize, oem: usize, n_oem: usize, n_elem: usize) -> bool {
        let elem = self.select_elem(channel, oem);
        match self {
            AdapterTag::Packed => elem < n_elem,
            AdapterTag::Interleaved => (channel / RX_CHANNELS_PER_OEM) % n_oem == oem && elem < n_elem,
        }
    }
}

/// The name + element geometry of a physical transducer array, as supplied
/// by a probe definition file/catalog (loading that catalog is out of scope
/// per spec §1 — this is just the resulting record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeDef {
    pub name: String,
    pub n_elem: usize,
    /// Element pitch in meters.
    pub pitch: f64,
}

/// Element geometry and adapter wiring for a single acquisition session.
///
/// Construction validates spec §4.1: `n_elem <= 128 * n_oem`, and (for the
/// generated channel maps) totality into the physical lane ranges.
#[derive(Debug, Clone)]
pub struct ProbeAdapterModel {
    x_elem: Vec<f64>,
    pitch: f64,
    n_oem: usize,
    adapter_tag: AdapterTag,
}

impl ProbeAdapterModel {
    /// Builds the model from a probe's element count/pitch and an adapter
    /// choice. `x[i] = (i - (n_elem - 1) / 2) * pitch`, symmetric about the
    /// array center (spec §3 "Geometry").
    pub fn new(n_elem: usize, pitch: f64, n_oem: usize, adapter_tag: AdapterTag) -> Result<Self> {
        Self::from_def(&ProbeDef { name: String::new(), n_elem, pitch }, n_oem, adapter_tag)
    }

    /// Builds the model from a [`ProbeDef`] and an adapter choice.
    pub fn from_def(probe: &ProbeDef, n_oem: usize, adapter_tag: AdapterTag) -> Result<Self> {
        let n_elem = probe.n_elem;
        let pitch = probe.pitch;
        if n_elem == 0 {
            return Err(UsqError::illegal_argument("probe must have at least one element"));
        }
        if n_oem == 0 {
            return Err(UsqError::illegal_argument("at least one OEM is required"));
        }
        if n_elem > TX_CHANNELS_PER_OEM * n_oem {
            return Err(UsqError::illegal_argument(format!(
                "n_elem ({n_elem}) exceeds addressable 128 * n_oem ({})",
                TX_CHANNELS_PER_OEM * n_oem
            )));
        }
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(UsqError::illegal_argument("pitch must be a positive, finite value"));
        }

        let center = (n_elem as f64 - 1.0) / 2.0;
        let x_elem = (0..n_elem).map(|i| (i as f64 - center) * pitch).collect();

        let model = Self {
            x_elem,
            pitch,
            n_oem,
            adapter_tag,
        };
        model.validate_channel_maps()?;
        Ok(model)
    }

    fn validate_channel_maps(&self) -> Result<()> {
        for k in 0..self.n_oem {
            for c in 0..TX_CHANNELS_PER_OEM {
                let lane = self.tx_channel_map(c, k);
                if lane >= TX_CHANNELS_PER_OEM * self.n_oem {
                    return Err(UsqError::illegal_argument(format!(
                        "TX channel map out of range for channel {c}, OEM {k}"
                    )));
                }
            }
            for c in 0..RX_CHANNELS_PER_OEM {
                let lane = self.rx_channel_map(c, k);
                if lane >= RX_CHANNELS_PER_OEM * self.n_oem {
                    return Err(UsqError::illegal_argument(format!(
                        "RX channel map out of range for channel {c}, OEM {k}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Maps a logical TX channel `c` on OEM `k` to its physical hardware
    /// lane. A property of the adapter, not the scan (spec §3 "Channel
    /// maps"): each OEM's 128 logical TX channels occupy a disjoint
    /// `128`-wide block of the global lane space.
    #[inline]
    pub fn tx_channel_map(&self, channel: usize, oem: usize) -> usize {
        channel + TX_CHANNELS_PER_OEM * oem
    }

    /// Maps a logical RX channel `c` on OEM `k` to its physical hardware
    /// lane, analogous to [`Self::tx_channel_map`] but over the 32-wide RX
    /// block per OEM.
    #[inline]
    pub fn rx_channel_map(&self, channel: usize, oem: usize) -> usize {
        channel + RX_CHANNELS_PER_OEM * oem
    }

    #[inline]
    pub fn n_elem(&self) -> usize {
        self.x_elem.len()
    }

    #[inline]
    pub fn n_oem(&self) -> usize {
        self.n_oem
    }

    #[inline]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    #[inline]
    pub fn adapter_tag(&self) -> AdapterTag {
        self.adapter_tag
    }

    #[inline]
    pub fn x_elem(&self) -> &[f64] {
        &self.x_elem
    }

    /// Interpolates the element-position grid at a fractional element index,
    /// used to resolve `txCenterElement` into meters (spec §4.2 step 3) and
    /// `rxCentElem` into elements (spec §4.4 "RX aperture per transmit").
    pub fn interp_element_position(&self, fractional_index: f64) -> f64 {
        crate::math::interp1(&self.x_elem, fractional_index)
    }

    #[inline]
    pub fn select_elem(&self, channel: usize, oem: usize) -> usize {
        self.adapter_tag.select_elem(channel, oem)
    }

    #[inline]
    pub fn is_active_channel(&self, channel: usize, oem: usize) -> bool {
        self.adapter_tag.is_active(channel, oem, self.n_oem, self.n_elem())
    }
}

/// Rounds `x` to the nearest integer using round-half-away-from-zero, the
/// convention the rest of the planner assumes for sample/element rounding.
#[inline]
pub fn round_half_away_from_zero(x: f64) -> i64 {
    x.round() as i64
}
