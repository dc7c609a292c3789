//! Published analysis result
//!
//! A `Frame` is what the producer publishes each round: the magnitude of
//! every frequency bin of the current window, plus the extremes the
//! consumers normalize against.

use sound_trail_core::bands::{self, BandRange};

/// Magnitude spectrum of one analysis window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    magnitudes: Vec<f32>,
    min: f32,
    max: f32,
}

impl Frame {
    pub fn new(magnitudes: Vec<f32>) -> Self {
        let (min, max) = magnitudes
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &m| {
                (lo.min(m), hi.max(m))
            });
        Self {
            magnitudes,
            min,
            max,
        }
    }

    /// Number of magnitude bins
    pub fn bins(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Smallest and largest magnitude over the whole frame
    pub fn extremes(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Largest magnitude inside `range`, clipped to the frame
    pub fn band_peak(&self, range: BandRange) -> Option<f32> {
        let to = range.to.min(self.magnitudes.len());
        self.magnitudes
            .get(range.from..to)?
            .iter()
            .copied()
            .reduce(f32::max)
    }

    /// Normalized log level of `range`, `None` when not computable
    pub fn band_level(&self, range: BandRange) -> Option<f32> {
        let peak = self.band_peak(range)?;
        bands::band_level(peak, self.min, self.max)
    }
}
