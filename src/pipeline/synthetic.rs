//! Self-contained collaborators for demos and tests
//!
//! `ToneSource` produces the spectrum of a tone sweeping upward across the
//! bins, so every band lights up in turn. `ScriptedInput` replays a fixed
//! command list, and `RecordingPresenter` keeps the last snapshot.

use std::collections::VecDeque;
use std::sync::Arc;

use sound_trail_core::parameters::Window;

use super::commands::Command;
use super::frame::Frame;
use super::traits::{InputSource, Presenter, Snapshot, SpectrumSource};
use crate::core::traits::Guarded;

/// Magnitude of bins away from the tone
const NOISE_FLOOR: f32 = 1.0;

/// Sweeping-tone spectrum source
#[derive(Debug, Clone)]
pub struct ToneSource {
    bins: usize,
    sample_rate: u32,
    frames_left: Option<u64>,
    position: usize,
    gain: u32,
}

impl ToneSource {
    /// Endless source producing frames of `bins` bins.
    pub fn new(bins: usize, sample_rate: u32) -> Self {
        Self {
            bins,
            sample_rate,
            frames_left: None,
            position: 1,
            gain: 50,
        }
    }

    /// Stop after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frames_left = Some(frames);
        self
    }

    /// Bin the tone currently sits on
    pub fn position(&self) -> usize {
        self.position
    }
}

impl SpectrumSource for ToneSource {
    fn next_frame(&mut self, window: Window) -> Option<Frame> {
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }

        // Wider windows leak more energy into neighbouring bins
        let spread = 1 + window.index();
        let peak = NOISE_FLOOR + self.gain as f32 * 10.0;
        let magnitudes = (0..self.bins)
            .map(|bin| {
                let distance = bin.abs_diff(self.position);
                if distance <= spread {
                    peak / (1 + distance) as f32
                } else {
                    NOISE_FLOOR
                }
            })
            .collect();

        self.position = if self.position + 1 >= self.bins {
            1
        } else {
            self.position + 1
        };
        Some(Frame::new(magnitudes))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn set_gain(&mut self, gain: u32) {
        self.gain = gain;
    }
}

/// Replays commands, one per poll after an initial number of empty polls
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<(u32, Command)>,
    polls: u32,
}

impl ScriptedInput {
    /// Each entry is `(poll index, command)`; entries must be ordered.
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = (u32, Command)>,
    {
        Self {
            script: script.into_iter().collect(),
            polls: 0,
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Option<Command> {
        let now = self.polls;
        match self.script.front() {
            Some(&(at, command)) if at <= now => {
                self.script.pop_front();
                Some(command)
            }
            _ => {
                // Only an empty poll ends the period, so count those
                self.polls += 1;
                None
            }
        }
    }
}

/// Presenter that records the most recent snapshot
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    last: Arc<Guarded<Option<Snapshot>>>,
    frames: Arc<Guarded<u64>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Snapshot> {
        self.last.get()
    }

    /// Number of snapshots presented
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, snapshot: &Snapshot) {
        self.last.set(Some(snapshot.clone()));
        self.frames.update(|n| n + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_source_sweeps_and_ends() {
        let mut source = ToneSource::new(16, 8_000).with_frame_limit(2);

        let first = source.next_frame(Window::Rectangular).unwrap();
        assert_eq!(first.bins(), 16);
        assert_eq!(first.magnitudes()[1], first.extremes().1);
        assert_eq!(source.position(), 2);

        assert!(source.next_frame(Window::Rectangular).is_some());
        assert!(source.next_frame(Window::Rectangular).is_none());
    }

    #[test]
    fn test_scripted_input_waits_for_its_poll() {
        let mut input = ScriptedInput::new([(0, Command::GainUp), (2, Command::Quit)]);

        assert_eq!(input.poll(), Some(Command::GainUp));
        assert_eq!(input.poll(), None);
        assert_eq!(input.poll(), None);
        assert_eq!(input.poll(), Some(Command::Quit));
        assert_eq!(input.poll(), None);
    }

    #[test]
    fn test_recording_presenter_shares_state() {
        let recorder = RecordingPresenter::new();
        let mut presenter = recorder.clone();
        assert!(recorder.last().is_none());

        let snapshot = Snapshot {
            elapsed_ms: 20,
            gain: 50,
            active_consumers: 24,
            scale: 1.0,
            window: Window::Welch,
            rounds_published: 1,
            trails: Vec::new(),
        };
        presenter.present(&snapshot);

        assert_eq!(recorder.frames(), 1);
        assert_eq!(recorder.last(), Some(snapshot));
    }
}
