//! Periodic task scheduler
//!
//! One OS thread per task, fixed priorities, absolute-time activation and
//! per-iteration deadline monitoring.
//!
//! # Components
//!
//! - [`registry`]: `Scheduler` and `TaskHandle` (creation, join, diagnostics)
//! - [`task`]: `TaskContext`, the activation/deadline API inside a task
//! - [`policy`]: `SchedPolicy` (round-robin with best-effort fallback)
//! - [`barrier`]: `PrecedenceBarrier` between one producer and N consumers
//! - [`stats`]: per-task reports
//! - [`error`]: `SchedulerError`, `BarrierError`
//!
//! The pure parameter, timer and statistics types live in
//! `sound_trail_core::scheduler` and are re-exported here.

pub mod barrier;
pub mod error;
pub mod policy;
pub mod registry;
pub mod stats;
pub mod task;

pub use barrier::{PrecedenceBarrier, Turn};
pub use error::{BarrierError, SchedulerError};
pub use policy::{PolicyOutcome, SchedPolicy};
pub use registry::{Scheduler, TaskHandle};
pub use stats::TaskReport;
pub use task::TaskContext;

pub use sound_trail_core::scheduler::{
    DeadlineStatus, SchedulerStats, TaskConfigError, TaskParams, TaskStats,
};
