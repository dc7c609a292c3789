//! Clamped step arithmetic for tunables
//!
//! Every runtime tunable moves in fixed steps between a minimum and a
//! maximum. `StepRange` keeps that arithmetic in one place so a step can
//! never leave the range, including floating-point steps that would overshoot
//! after accumulated rounding.

use core::ops::{Add, Sub};

/// Inclusive range with a base value and a step size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRange<T> {
    pub min: T,
    pub max: T,
    pub base: T,
    pub step: T,
}

impl<T> StepRange<T>
where
    T: Copy + PartialOrd + Add<Output = T> + Sub<Output = T>,
{
    pub const fn new(min: T, base: T, max: T, step: T) -> Self {
        Self {
            min,
            max,
            base,
            step,
        }
    }

    /// Force `value` into `[min, max]`.
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// One step up, saturating at `max`.
    pub fn step_up(&self, value: T) -> T {
        let value = self.clamp(value);
        if self.max - value <= self.step {
            self.max
        } else {
            value + self.step
        }
    }

    /// One step down, saturating at `min`.
    pub fn step_down(&self, value: T) -> T {
        let value = self.clamp(value);
        if value - self.min <= self.step {
            self.min
        } else {
            value - self.step
        }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}
