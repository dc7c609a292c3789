//! Tunable parameter types
//!
//! This module provides the value-level rules for the pipeline's runtime
//! tunables: their ranges, base values and step sizes, plus the analysis
//! window selector. Locking and sharing across tasks is handled by the
//! runtime crate's guarded values.

pub mod range;
pub mod window;

pub use range::StepRange;
pub use window::Window;

/// Output gain, in percent
pub const GAIN: StepRange<u32> = StepRange::new(0, 50, 100, 1);

/// Number of consumers doing useful work each round
pub const ACTIVE_CONSUMERS: StepRange<usize> = StepRange::new(8, 24, 32, 1);

/// Presentation scale factor
pub const SCALE: StepRange<f32> = StepRange::new(0.5, 1.0, 2.0, 0.1);
