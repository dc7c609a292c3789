//! Core traits for platform-agnostic timing.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - The OS-backed clock lives in the runtime crate

pub mod time;

pub use time::{MockTime, TimeSource};
