//! Task scheduler types and timing logic for periodic tasks
//!
//! This module provides the pure parts of the scheduler without any thread
//! or OS dependencies. Thread creation, real-time policies and blocking
//! sleeps are handled by the runtime crate.
//!
//! # Components
//!
//! - [`types`]: Core types (TaskParams, TaskStats, SchedulerStats)
//! - [`timing`]: Periodic activation state machine and deadline checks
//!
//! # Example
//!
//! ```rust
//! use sound_trail_core::scheduler::{PeriodicTimer, TaskParams, TaskStats};
//! use sound_trail_core::traits::{MockTime, TimeSource};
//!
//! let params = TaskParams::new("producer", 20, 20, 90);
//! params.validate().unwrap();
//!
//! let clock = MockTime::new();
//! let mut timer = PeriodicTimer::from_params(&params);
//! let mut stats = TaskStats::default();
//!
//! timer.activate(clock.now());
//! clock.advance_ms(5);
//! assert!(!timer.check_deadline(clock.now(), &mut stats).is_missed());
//! timer.wait(&clock);
//! ```

pub mod timing;
pub mod types;

pub use timing::*;
pub use types::*;
