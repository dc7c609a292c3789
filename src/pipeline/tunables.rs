//! Runtime tunables shared between tasks
//!
//! Each tunable is its own [`Guarded`] value. Consumers read the active band
//! count every period, the producer reads the window selector, the display
//! reads everything, and only the input task writes; none of them need a
//! consistent view across tunables, so there is no common lock.

use sound_trail_core::parameters::{StepRange, Window, ACTIVE_CONSUMERS, GAIN, SCALE};

use super::commands::Command;
use crate::core::traits::{Guarded, SharedState};
use crate::log_debug;

/// Shared runtime parameters of the pipeline
#[derive(Debug)]
pub struct Tunables {
    done: Guarded<bool>,
    gain: Guarded<u32>,
    active_consumers: Guarded<usize>,
    scale: Guarded<f32>,
    elapsed_ms: Guarded<u64>,
    window: Guarded<Window>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self::new()
    }
}

/// Step `value` once within `range`, returning the new value.
fn step<T, S>(value: &S, range: &StepRange<T>, up: bool) -> T
where
    T: Copy + PartialOrd + core::ops::Add<Output = T> + core::ops::Sub<Output = T>,
    S: SharedState<T>,
{
    value.with_mut(|v| {
        *v = if up { range.step_up(*v) } else { range.step_down(*v) };
        *v
    })
}

impl Tunables {
    /// All tunables at their base values.
    pub fn new() -> Self {
        Self {
            done: Guarded::new(false),
            gain: Guarded::new(GAIN.base),
            active_consumers: Guarded::new(ACTIVE_CONSUMERS.base),
            scale: Guarded::new(SCALE.base),
            elapsed_ms: Guarded::new(0),
            window: Guarded::new(Window::default()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done.get()
    }

    /// Ask every task to stop at its next period.
    pub fn request_stop(&self) {
        self.done.set(true);
    }

    pub fn gain(&self) -> u32 {
        self.gain.get()
    }

    pub fn set_gain(&self, gain: u32) {
        self.gain.set(GAIN.clamp(gain));
    }

    pub fn active_consumers(&self) -> usize {
        self.active_consumers.get()
    }

    pub fn set_active_consumers(&self, n: usize) {
        self.active_consumers.set(ACTIVE_CONSUMERS.clamp(n));
    }

    pub fn scale(&self) -> f32 {
        self.scale.get()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.get()
    }

    /// Add one frame's worth of stream time.
    pub fn advance_elapsed(&self, ms: u64) -> u64 {
        self.elapsed_ms.update(|t| t.saturating_add(ms))
    }

    pub fn window(&self) -> Window {
        self.window.get()
    }

    pub fn set_window(&self, window: Window) {
        self.window.set(window);
    }

    /// Apply one user command.
    ///
    /// `Quit` only raises the done flag; waking tasks blocked on the barrier
    /// is up to the owner of the barrier.
    pub fn apply(&self, command: Command) {
        match command {
            Command::ScaleUp => {
                step(&self.scale, &SCALE, true);
            }
            Command::ScaleDown => {
                step(&self.scale, &SCALE, false);
            }
            Command::FewerBands => {
                step(&self.active_consumers, &ACTIVE_CONSUMERS, false);
            }
            Command::MoreBands => {
                step(&self.active_consumers, &ACTIVE_CONSUMERS, true);
            }
            Command::GainUp => {
                step(&self.gain, &GAIN, true);
            }
            Command::GainDown => {
                step(&self.gain, &GAIN, false);
            }
            Command::SelectWindow(index) => {
                if let Some(window) = Window::from_index(index) {
                    self.window.set(window);
                }
            }
            Command::Quit => self.request_stop(),
        }
        log_debug!("applied {:?}", command);
    }
}
