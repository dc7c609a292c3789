//! Per-consumer band trails
//!
//! Every consumer appends one sample per round to its own trail, and the
//! display task reads all trails. Each trail has its own lock, so a consumer
//! only ever contends with the display, never with another consumer.

use heapless::{HistoryBuf, Vec};

use crate::core::traits::{Guarded, SharedState};

/// Samples kept per trail
pub const TRAIL_LEN: usize = 8;

/// One consumer's output for one round
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandSample {
    /// Smoothed, normalized band level
    pub level: f32,
    /// Frequency of the band's upper edge in Hz
    pub freq_hz: u32,
    /// Whether the consumer was active this round
    pub active: bool,
}

impl BandSample {
    /// Sample recorded by a consumer outside the active band count
    pub const INACTIVE: BandSample = BandSample {
        level: 0.0,
        freq_hz: 0,
        active: false,
    };

    pub const fn active(level: f32, freq_hz: u32) -> Self {
        Self {
            level,
            freq_hz,
            active: true,
        }
    }
}

/// Fixed-length history of one consumer's samples, oldest evicted first
#[derive(Debug, Default)]
pub struct BandTrail {
    samples: HistoryBuf<BandSample, TRAIL_LEN>,
}

impl BandTrail {
    pub const fn new() -> Self {
        Self {
            samples: HistoryBuf::new(),
        }
    }

    pub fn push(&mut self, sample: BandSample) {
        self.samples.write(sample);
    }

    pub fn latest(&self) -> Option<BandSample> {
        self.samples.recent().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    /// Samples in oldest-first order
    pub fn to_vec(&self) -> Vec<BandSample, TRAIL_LEN> {
        let mut out = Vec::new();
        for sample in self.samples.oldest_ordered() {
            // Capacity matches the history length
            let _ = out.push(*sample);
        }
        out
    }
}

/// Trails of every consumer, indexed by the consumer's `user_id`
#[derive(Debug)]
pub struct BandTrails {
    trails: std::vec::Vec<Guarded<BandTrail>>,
}

impl BandTrails {
    pub fn new(consumers: usize) -> Self {
        Self {
            trails: (0..consumers).map(|_| Guarded::new(BandTrail::new())).collect(),
        }
    }

    /// Number of trails
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    /// Append a sample to trail `id`. Out-of-range ids are ignored.
    pub fn push(&self, id: usize, sample: BandSample) {
        if let Some(trail) = self.trails.get(id) {
            trail.with_mut(|t| t.push(sample));
        }
    }

    pub fn latest(&self, id: usize) -> Option<BandSample> {
        self.trails.get(id).and_then(|trail| trail.with(|t| t.latest()))
    }

    /// Copy of trail `id`, oldest first
    pub fn snapshot(&self, id: usize) -> Vec<BandSample, TRAIL_LEN> {
        self.trails
            .get(id)
            .map(|trail| trail.with(|t| t.to_vec()))
            .unwrap_or_default()
    }

    /// Copies of every trail, each taken under its own lock
    pub fn snapshot_all(&self) -> std::vec::Vec<Vec<BandSample, TRAIL_LEN>> {
        (0..self.trails.len()).map(|id| self.snapshot(id)).collect()
    }
}
