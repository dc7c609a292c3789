//! Task bodies and the state they share
//!
//! Every body follows the same periodic shape:
//!
//! ```text
//! activate
//! loop {
//!     work (producer and consumers rendezvous on the barrier)
//!     done = tunables.is_done()
//!     check_deadline            (a miss is logged, never fatal)
//!     if done { break }
//!     wait_for_activation       (absolute sleep to the next release)
//! }
//! ```

use std::sync::Arc;

use sound_trail_core::bands::{band_range, bin_frequency_hz, smooth_level};

use super::commands::Command;
use super::config::PipelineConfig;
use super::frame::Frame;
use super::traits::{InputSource, Presenter, Snapshot, SpectrumSource};
use super::trails::{BandSample, BandTrails};
use super::tunables::Tunables;
use crate::core::scheduler::{PrecedenceBarrier, TaskContext, Turn};
use crate::core::traits::sync::SharedState;
use crate::core::traits::Guarded;
use crate::{log_error, log_info};

/// Commands applied per input period at most
const MAX_COMMANDS_PER_PERIOD: usize = 16;

/// Everything the pipeline tasks share
#[derive(Debug)]
pub struct PipelineState {
    pub tunables: Tunables,
    pub barrier: PrecedenceBarrier,
    /// Result of the most recently published round
    pub frame: Guarded<Frame>,
    pub trails: BandTrails,
    consumers: usize,
    window_samples: usize,
    sample_rate: u32,
}

impl PipelineState {
    /// State for `config`, analysing a stream sampled at `sample_rate`.
    pub fn new(config: &PipelineConfig, sample_rate: u32) -> Self {
        Self {
            tunables: Tunables::new(),
            barrier: PrecedenceBarrier::new(config.consumers),
            frame: Guarded::new(Frame::default()),
            trails: BandTrails::new(config.consumers),
            consumers: config.consumers,
            window_samples: config.window_samples,
            sample_rate,
        }
    }

    /// Number of consumer tasks
    pub fn consumers(&self) -> usize {
        self.consumers
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Stream time covered by one frame, in milliseconds
    pub fn frame_duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.window_samples as u64 * 1000 / self.sample_rate as u64
    }

    /// Raise `done` and wake every task blocked on the barrier.
    pub fn stop(&self) {
        self.tunables.request_stop();
        self.barrier.close();
    }

    /// Apply a user command; `Quit` stops the whole pipeline.
    pub fn apply(&self, command: Command) {
        if command == Command::Quit {
            log_info!("quit requested");
            self.stop();
        } else {
            self.tunables.apply(command);
        }
    }

    /// Current state for the presenter
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            elapsed_ms: self.tunables.elapsed_ms(),
            gain: self.tunables.gain(),
            active_consumers: self.tunables.active_consumers(),
            scale: self.tunables.scale(),
            window: self.tunables.window(),
            rounds_published: self.barrier.rounds_published(),
            trails: self.trails.snapshot_all(),
        }
    }

    /// Compute consumer `id`'s sample from the published frame.
    fn band_sample(&self, id: usize, active: usize, level: &mut f32) -> BandSample {
        if id >= active {
            return BandSample::INACTIVE;
        }
        self.frame.with(|frame| {
            let range = band_range(id, active, frame.bins());
            *level = smooth_level(*level, frame.band_level(range));
            BandSample::active(
                *level,
                bin_frequency_hz(range.to, self.sample_rate, self.window_samples),
            )
        })
    }
}

/// Producer: one analysis frame per round, published to every consumer.
pub fn run_producer<S: SpectrumSource>(mut ctx: TaskContext, state: Arc<PipelineState>, mut source: S) {
    let mut gain = None;

    ctx.activate();
    loop {
        if state.barrier.producer_begin_round().is_closed() {
            break;
        }

        let current_gain = state.tunables.gain();
        if gain != Some(current_gain) {
            source.set_gain(current_gain);
            gain = Some(current_gain);
        }

        match source.next_frame(state.tunables.window()) {
            Some(frame) => {
                state.frame.set(frame);
                state.tunables.advance_elapsed(state.frame_duration_ms());
            }
            None => {
                log_info!("end of stream after {} ms", state.tunables.elapsed_ms());
                state.tunables.request_stop();
            }
        }

        if let Err(err) = state.barrier.producer_end_round(state.consumers) {
            log_error!("{}) {}: {}", ctx.id(), ctx.name(), err);
            state.stop();
            break;
        }

        let done = state.tunables.is_done();
        ctx.check_deadline();
        if done {
            break;
        }
        ctx.wait_for_activation();
    }

    // Consumers may exit on `done` without taking the last round
    state.barrier.close();
}

/// Consumer: one band of each published frame, identified by `user_id`.
pub fn run_consumer(mut ctx: TaskContext, state: Arc<PipelineState>) {
    let id = ctx.user_id();
    let mut last_seen = 0;
    let mut level = 0.0;

    ctx.activate();
    loop {
        let active = state.tunables.active_consumers().min(state.consumers);

        match state.barrier.consumer_wait_turn(last_seen) {
            Turn::Ready(round) => last_seen = round,
            Turn::Closed => break,
        }
        let sample = state.band_sample(id, active, &mut level);
        state.barrier.consumer_end_turn();

        state.trails.push(id, sample);

        let done = state.tunables.is_done();
        ctx.check_deadline();
        if done {
            break;
        }
        ctx.wait_for_activation();
    }
}

/// Input: apply pending user commands.
pub fn run_input<I: InputSource>(mut ctx: TaskContext, state: Arc<PipelineState>, mut input: I) {
    ctx.activate();
    loop {
        for _ in 0..MAX_COMMANDS_PER_PERIOD {
            match input.poll() {
                Some(command) => state.apply(command),
                None => break,
            }
        }

        let done = state.tunables.is_done();
        ctx.check_deadline();
        if done {
            break;
        }
        ctx.wait_for_activation();
    }
}

/// Display: hand a snapshot to the presenter every period.
pub fn run_display<P: Presenter>(mut ctx: TaskContext, state: Arc<PipelineState>, mut presenter: P) {
    ctx.activate();
    loop {
        presenter.present(&state.snapshot());

        let done = state.tunables.is_done();
        ctx.check_deadline();
        if done {
            break;
        }
        ctx.wait_for_activation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sound_trail_core::parameters::Window;

    fn state(consumers: usize) -> PipelineState {
        let config = PipelineConfig {
            consumers,
            ..PipelineConfig::default()
        };
        PipelineState::new(&config, 44_100)
    }

    #[test]
    fn test_frame_duration() {
        assert_eq!(state(4).frame_duration_ms(), 20);
    }

    #[test]
    fn test_inactive_consumer_sample() {
        let s = state(32);
        s.tunables.set_active_consumers(8);
        let mut level = 0.7;
        assert_eq!(s.band_sample(8, 8, &mut level), BandSample::INACTIVE);
        assert_eq!(level, 0.7);
    }

    #[test]
    fn test_active_consumer_sample_is_smoothed() {
        let s = state(4);
        let mut magnitudes = vec![1.0f32; 441];
        magnitudes[440] = 1024.0;
        for m in magnitudes.iter_mut().take(12).skip(2) {
            *m = 32.0;
        }
        s.frame.set(Frame::new(magnitudes));

        let range = band_range(0, 4, 441);
        let mut level = 0.0;
        let first = s.band_sample(0, 4, &mut level);
        assert!(first.active);
        assert_eq!(first.freq_hz, bin_frequency_hz(range.to, 44_100, 882));

        // Low-pass: the level converges towards the raw value
        let second = s.band_sample(0, 4, &mut level);
        assert!(second.level > first.level);
        assert!(second.level <= 1.0);
    }

    #[test]
    fn test_quit_stops_everything() {
        let s = state(2);
        s.apply(Command::GainDown);
        assert_eq!(s.tunables.gain(), 49);

        s.apply(Command::Quit);
        assert!(s.tunables.is_done());
        assert!(s.barrier.is_closed());
        assert_eq!(s.barrier.consumer_wait_turn(0), Turn::Closed);
    }

    #[test]
    fn test_snapshot_reflects_tunables() {
        let s = state(3);
        s.tunables.set_window(Window::Blackman);
        s.tunables.advance_elapsed(40);
        s.trails.push(1, BandSample::active(0.25, 300));

        let snap = s.snapshot();
        assert_eq!(snap.window, Window::Blackman);
        assert_eq!(snap.elapsed_ms, 40);
        assert_eq!(snap.trails.len(), 3);
        let active: Vec<_> = snap.active_levels().map(|(id, _)| id).collect();
        assert_eq!(active, vec![1]);
    }
}
