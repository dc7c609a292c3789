//! Log Router
//!
//! `log::Log` backend for the crate. Each record is routed to:
//! - RingBufferSink: stores recent messages for later retrieval
//! - stderr: warnings and errors always, every level when verbose
//!
//! ## Usage
//!
//! ```
//! use sound_trail::core::log_router;
//! use sound_trail::log_warn;
//!
//! log_router::init();
//! log_warn!("0) deadline missed! woet: 21 ms");
//!
//! // Drains the buffer
//! let logs = log_router::get_buffered_logs();
//! assert!(logs.iter().any(|m| m.message.contains("deadline missed")));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use heapless::Vec;

use crate::core::log_buffer::{LogLevel, LogMessage, RingBufferSink, LOG_BUFFER_SIZE};

/// Log router that dispatches messages to its sinks
pub struct LogRouter {
    buffer_sink: RingBufferSink,
    echo_level: LogLevel,
}

impl LogRouter {
    /// Router that echoes warnings and errors.
    pub const fn new() -> Self {
        Self {
            buffer_sink: RingBufferSink::new(),
            echo_level: LogLevel::Warn,
        }
    }

    /// Buffer `msg` and report whether it should be echoed.
    ///
    /// The echo itself happens outside the router lock.
    pub fn route(&mut self, msg: LogMessage) -> Option<LogMessage> {
        let echo = (msg.level >= self.echo_level).then(|| msg.clone());
        self.buffer_sink.push(msg);
        echo
    }

    /// Lowest level echoed to stderr
    pub fn set_echo_level(&mut self, level: LogLevel) {
        self.echo_level = level;
    }

    pub fn buffer_sink(&self) -> &RingBufferSink {
        &self.buffer_sink
    }

    pub fn buffer_sink_mut(&mut self) -> &mut RingBufferSink {
        &mut self.buffer_sink
    }
}

impl Default for LogRouter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Global router
// =============================================================================

static LOG_ROUTER: Mutex<LogRouter> = Mutex::new(LogRouter::new());

static VERBOSE: AtomicBool = AtomicBool::new(false);

static LOGGER: RouterLogger = RouterLogger;

/// `log::Log` implementation backed by the global router
struct RouterLogger;

fn lock_router() -> MutexGuard<'static, LogRouter> {
    // A panic while holding the lock leaves only a partially filled ring
    LOG_ROUTER.lock().unwrap_or_else(|poison| poison.into_inner())
}

impl log::Log for RouterLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        route_log(LogMessage::from_args(
            record.level().into(),
            *record.args(),
        ));
    }

    fn flush(&self) {}
}

/// Install the router as the `log` backend at `Info` and above.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init() {
    init_with_verbosity(false);
}

/// Install the router; `verbose` lowers the filter to `Trace` and echoes
/// every level to stderr.
pub fn init_with_verbosity(verbose: bool) {
    // Err only means a logger is already installed
    let _ = log::set_logger(&LOGGER);

    VERBOSE.store(verbose, Ordering::Relaxed);
    let (filter, echo) = if verbose {
        (log::LevelFilter::Trace, LogLevel::Trace)
    } else {
        (log::LevelFilter::Info, LogLevel::Warn)
    };
    log::set_max_level(filter);
    lock_router().set_echo_level(echo);
}

/// Whether verbose logging was requested at init
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Route a log message through the global router
pub fn route_log(msg: LogMessage) {
    let echo = lock_router().route(msg);
    if let Some(msg) = echo {
        eprintln!("{}", msg);
    }
}

/// Get all buffered logs (drains the buffer)
pub fn get_buffered_logs() -> Vec<LogMessage, LOG_BUFFER_SIZE> {
    lock_router().buffer_sink_mut().drain()
}

/// Peek at buffered logs without clearing
pub fn peek_buffered_logs<F, R>(f: F) -> R
where
    F: FnOnce(&RingBufferSink) -> R,
{
    f(lock_router().buffer_sink())
}

/// Get the current number of buffered messages
pub fn buffer_len() -> usize {
    lock_router().buffer_sink().len()
}

/// Get the number of messages lost due to buffer overflow
pub fn overflow_count() -> u32 {
    lock_router().buffer_sink().overflow_count()
}

/// Clear all buffered messages
pub fn clear_buffer() {
    lock_router().buffer_sink_mut().clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn make_msg(level: LogLevel, text: &str) -> LogMessage {
        LogMessage::from_args(level, format_args!("{}", text))
    }

    #[test]
    fn test_route_buffers_every_level() {
        let mut router = LogRouter::new();

        assert!(router.route(make_msg(LogLevel::Debug, "debug")).is_none());
        assert!(router.route(make_msg(LogLevel::Info, "info")).is_none());

        assert_eq!(router.buffer_sink().len(), 2);
    }

    #[test]
    fn test_route_echoes_warnings_and_errors() {
        let mut router = LogRouter::new();

        let echoed = router.route(make_msg(LogLevel::Warn, "late"));
        assert_eq!(echoed.map(|m| m.level), Some(LogLevel::Warn));
        assert!(router.route(make_msg(LogLevel::Error, "join")).is_some());
    }

    #[test]
    fn test_echo_level_is_adjustable() {
        let mut router = LogRouter::new();
        router.set_echo_level(LogLevel::Trace);

        assert!(router.route(make_msg(LogLevel::Trace, "tick")).is_some());
    }

    #[test]
    #[serial]
    fn test_global_router_receives_macro_output() {
        init();
        clear_buffer();

        crate::log_warn!("{}) deadline missed! woet: {} ms", 7, 31);

        let logs = get_buffered_logs();
        assert!(logs
            .iter()
            .any(|m| m.level == LogLevel::Warn
                && m.message.as_str() == "7) deadline missed! woet: 31 ms"));
    }

    #[test]
    #[serial]
    fn test_global_router_filters_below_info() {
        init();
        clear_buffer();

        crate::log_debug!("created task probe-debug");

        let found = peek_buffered_logs(|sink| {
            sink.iter()
                .any(|m| m.message.as_str() == "created task probe-debug")
        });
        assert!(!found);
    }
}
