//! Core runtime
//!
//! The thread-level half of the framework: the task scheduler, the
//! precedence barrier, guarded shared values and logging.

pub mod log_buffer;
pub mod log_router;
pub mod logging;
pub mod scheduler;
pub mod traits;
