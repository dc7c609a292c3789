//! sound_trail_core - Pure no_std timing and tunable logic for sound_trail
//!
//! This crate contains the platform-agnostic half of the periodic task
//! framework: absolute-time arithmetic, the drift-free activation and
//! deadline state machine, tunable ranges, and the band partition used by
//! the analysis consumers. Everything here is testable on host with
//! [`traits::MockTime`] and has no OS dependencies.
//!
//! # Modules
//!
//! - [`time`]: Absolute timestamps and interval arithmetic
//! - [`traits`]: Clock abstraction (`TimeSource`, `MockTime`)
//! - [`scheduler`]: Task parameters, statistics and the periodic timer
//! - [`parameters`]: Tunable ranges and the analysis window selector
//! - [`bands`]: Logarithmic bin partition and level smoothing

#![cfg_attr(not(test), no_std)]

pub mod bands;
pub mod parameters;
pub mod scheduler;
pub mod time;
pub mod traits;
