//! Partition of one analysis result among the consumers
//!
//! Each active consumer owns one contiguous run of frequency bins. Bands are
//! spaced logarithmically, so low bands are narrow and high bands wide, and
//! every band index is shifted by its id so that no two bands start on the
//! same bin even where the logarithmic spacing is below one bin.
//!
//! For `n` active consumers over `bins` magnitude bins:
//!
//! ```text
//! step = log2(bins - n) / (n + 1)
//! from = round(2^(step * (id + 1))) + (id + 1)
//! to   = round(2^(step * (id + 2))) + (id + 2)
//! ```
//!
//! The last band's upper edge is clamped to `bins`.

use libm::{exp2f, log2f, roundf};

/// Low-pass constant for per-round level smoothing
pub const LEVEL_FILTER: f32 = 0.5;

/// Half-open bin range `[from, to)` owned by one consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BandRange {
    pub from: usize,
    pub to: usize,
}

impl BandRange {
    /// The empty range used by inactive consumers
    pub const EMPTY: BandRange = BandRange { from: 0, to: 0 };

    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }
}

/// Bin range for consumer `id` when `n` consumers share `bins` bins.
///
/// Consumers with `id >= n` are inactive and get [`BandRange::EMPTY`], as
/// does any layout with fewer bins than consumers.
pub fn band_range(id: usize, n: usize, bins: usize) -> BandRange {
    if id >= n || bins <= n {
        return BandRange::EMPTY;
    }

    let step = log2f((bins - n) as f32) / (n + 1) as f32;
    let edge = |k: usize| (roundf(exp2f(step * k as f32)) as usize + k).min(bins);

    BandRange {
        from: edge(id + 1),
        to: edge(id + 2),
    }
}

/// Frequency in Hz of bin `bin` for a window of `window_samples` samples.
pub fn bin_frequency_hz(bin: usize, sample_rate: u32, window_samples: usize) -> u32 {
    if window_samples == 0 {
        return 0;
    }
    ((bin as u64 * sample_rate as u64) / window_samples as u64) as u32
}

/// Normalized level of a band on a log scale.
///
/// `band_peak` is the largest magnitude inside the band and `frame_min` /
/// `frame_max` the extremes over the whole frame. Returns `None` when the
/// result is not finite (silent frame, flat frame).
pub fn band_level(band_peak: f32, frame_min: f32, frame_max: f32) -> Option<f32> {
    let lo = log2f(frame_min);
    let hi = log2f(frame_max);
    let level = (log2f(band_peak) - lo) / (hi - lo);
    if level.is_finite() {
        Some(level)
    } else {
        None
    }
}

/// First-order low-pass: blend the previous level with the new one.
///
/// A non-finite new level resets the output to zero.
pub fn smooth_level(previous: f32, level: Option<f32>) -> f32 {
    match level {
        Some(v) => previous * LEVEL_FILTER + (1.0 - LEVEL_FILTER) * v,
        None => 0.0,
    }
}
