//! Logging abstraction
//!
//! Provides the crate's logging macros. Every macro forwards to the `log`
//! facade with the target [`LOG_TARGET`], so whichever `log::Log`
//! implementation the host installs receives the records. The bundled
//! implementation is [`crate::core::log_router::LogRouter`], which keeps the
//! most recent messages in a ring buffer and echoes warnings and errors to
//! stderr.
//!
//! ## Usage
//!
//! ```
//! use sound_trail::{log_info, log_warn};
//!
//! sound_trail::core::log_router::init();
//! log_info!("pipeline started with {} consumers", 24);
//! log_warn!("{}) deadline missed! woet: {} ms", 3, 27);
//! ```

/// Target attached to every record emitted by this crate
pub const LOG_TARGET: &str = "sound_trail";

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        ::log::info!(target: $crate::core::logging::LOG_TARGET, $($arg)*)
    };
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        ::log::warn!(target: $crate::core::logging::LOG_TARGET, $($arg)*)
    };
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        ::log::error!(target: $crate::core::logging::LOG_TARGET, $($arg)*)
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        ::log::debug!(target: $crate::core::logging::LOG_TARGET, $($arg)*)
    };
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        ::log::trace!(target: $crate::core::logging::LOG_TARGET, $($arg)*)
    };
}
