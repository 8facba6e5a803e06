//! The canonical RF tensor (spec §3 "Canonical RF"): `int16` samples shaped
//! `[nSamp, rxChannels, nTx, nRep]`, stored flat in column-major order (the
//! sample axis varies fastest), matching the axis order of that shape
//! notation.

/// A dense, column-major 4-D tensor of raw RF samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RfTensor {
    n_samp: usize,
    n_channels: usize,
    n_tx: usize,
    n_rep: usize,
    data: Vec<i16>,
}

impl RfTensor {
    pub(crate) fn zeros(n_samp: usize, n_channels: usize, n_tx: usize, n_rep: usize) -> Self {
        Self {
            n_samp,
            n_channels,
            n_tx,
            n_rep,
            data: vec![0; n_samp * n_channels * n_tx * n_rep],
        }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.n_samp, self.n_channels, self.n_tx, self.n_rep)
    }

    #[inline]
    fn flat_index(&self, samp: usize, channel: usize, tx: usize, rep: usize) -> usize {
        debug_assert!(samp < self.n_samp && channel < self.n_channels && tx < self.n_tx && rep < self.n_rep);
        samp + self.n_samp * (channel + self.n_channels * (tx + self.n_tx * rep))
    }

    #[inline]
    pub fn get(&self, samp: usize, channel: usize, tx: usize, rep: usize) -> i16 {
        self.data[self.flat_index(samp, channel, tx, rep)]
    }

    #[inline]
    pub(crate) fn set(&mut self, samp: usize, channel: usize, tx: usize, rep: usize, value: i16) {
        let idx = self.flat_index(samp, channel, tx, rep);
        self.data[idx] = value;
    }

    /// The flat, column-major backing buffer, for callers that want to hand
    /// the whole tensor to a reconstruction collaborator (spec §6) without
    /// going through per-sample accessors.
    pub fn as_slice(&self) -> &[i16] {
        &self.data
    }
}
