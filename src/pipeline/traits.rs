//! Collaborator boundaries of the pipeline
//!
//! The pipeline drives three external collaborators and knows nothing else
//! about them: a spectrum source that yields one analysis frame per round,
//! an input source that yields user commands, and a presenter that renders
//! snapshots of the published state.

use heapless::Vec;
use sound_trail_core::parameters::Window;

use super::commands::Command;
use super::frame::Frame;
use super::trails::{BandSample, TRAIL_LEN};

/// Producer-side analysis engine
pub trait SpectrumSource: Send {
    /// Analyse the next window of the stream with `window` applied.
    ///
    /// Returns `None` at end of stream.
    fn next_frame(&mut self, window: Window) -> Option<Frame>;

    /// Stream sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Output gain in percent changed; sources without playback ignore it.
    fn set_gain(&mut self, _gain: u32) {}
}

/// Source of user commands, polled once per input period
pub trait InputSource: Send {
    /// Next pending command, or `None` when there is nothing to do.
    fn poll(&mut self) -> Option<Command>;
}

/// Renders the published state, once per display period
pub trait Presenter: Send {
    fn present(&mut self, snapshot: &Snapshot);
}

/// Consistent-per-field copy of what the display shows
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub elapsed_ms: u64,
    pub gain: u32,
    pub active_consumers: usize,
    pub scale: f32,
    pub window: Window,
    pub rounds_published: u64,
    /// One trail per consumer, oldest sample first
    pub trails: std::vec::Vec<Vec<BandSample, TRAIL_LEN>>,
}

impl Snapshot {
    /// Latest sample of every consumer that was active in its last round
    pub fn active_levels(&self) -> impl Iterator<Item = (usize, &BandSample)> + '_ {
        self.trails
            .iter()
            .enumerate()
            .filter_map(|(id, trail)| trail.last().map(|s| (id, s)))
            .filter(|(_, s)| s.active)
    }
}

/// Input source that never produces a command
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> Option<Command> {
        None
    }
}

/// Presenter that discards every snapshot
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _snapshot: &Snapshot) {}
}
