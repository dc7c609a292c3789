//! sound_trail - Fixed-priority periodic task framework
//!
//! This library runs periodic tasks on dedicated OS threads with fixed
//! priorities, drift-free absolute-time activation and per-iteration
//! deadline monitoring, and uses them to drive a producer/multi-consumer
//! spectrum pipeline.
//!
//! The pure timing arithmetic lives in the `sound_trail_core` crate and is
//! re-exported here where the runtime API needs it.

// Core systems: scheduler, barrier, guarded values, logging
pub mod core;

// Hosting application: spectrum pipeline and its collaborators
pub mod pipeline;

pub use sound_trail_core::{bands, parameters, time};
