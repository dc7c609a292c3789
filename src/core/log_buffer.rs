//! Log Ring Buffer
//!
//! Fixed-capacity storage for the most recent log messages, built on
//! `heapless::HistoryBuf` so pushing a record never allocates. Task threads
//! log deadline misses from inside their periodic loop; the buffer lets a
//! host or test read those records back after the fact.
//!
//! ## Features
//!
//! - Capacity of 32 messages, oldest evicted first
//! - Overflow counting for diagnostics
//! - Messages longer than 256 bytes are truncated on a character boundary

use core::fmt::{self, Write};

use heapless::{HistoryBuf, String, Vec};

/// Buffer capacity in number of messages
pub const LOG_BUFFER_SIZE: usize = 32;

/// Maximum message size in bytes
pub const LOG_MSG_SIZE: usize = 256;

/// Severity, ordered from `Trace` up to `Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => LogLevel::Trace,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Error => LogLevel::Error,
        }
    }
}

/// One buffered record
#[derive(Debug, Clone)]
pub struct LogMessage {
    pub level: LogLevel,
    pub message: String<LOG_MSG_SIZE>,
}

impl LogMessage {
    /// Create a new log message
    pub fn new(level: LogLevel, message: String<LOG_MSG_SIZE>) -> Self {
        Self { level, message }
    }

    /// Render `args` into a message, truncating at the capacity.
    pub fn from_args(level: LogLevel, args: fmt::Arguments<'_>) -> Self {
        let mut writer = TruncatingWriter {
            buf: String::new(),
        };
        // The writer never reports an error
        let _ = writer.write_fmt(args);
        Self::new(level, writer.buf)
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// `fmt::Write` adapter that drops whatever does not fit.
struct TruncatingWriter {
    buf: String<LOG_MSG_SIZE>,
}

impl Write for TruncatingWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.buf.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Most recent `LOG_BUFFER_SIZE` log records
pub struct RingBufferSink {
    buffer: HistoryBuf<LogMessage, LOG_BUFFER_SIZE>,
    overflow_count: u32,
}

impl RingBufferSink {
    pub const fn new() -> Self {
        Self {
            buffer: HistoryBuf::new(),
            overflow_count: 0,
        }
    }

    /// Push a message, evicting the oldest one when full.
    pub fn push(&mut self, msg: LogMessage) {
        if self.buffer.len() == LOG_BUFFER_SIZE {
            self.overflow_count = self.overflow_count.saturating_add(1);
        }
        self.buffer.write(msg);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Number of messages lost to eviction
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    /// Iterate over messages in oldest-first order
    pub fn iter(&self) -> impl Iterator<Item = &LogMessage> {
        self.buffer.oldest_ordered()
    }

    /// Drain all messages in oldest-first order.
    pub fn drain(&mut self) -> Vec<LogMessage, LOG_BUFFER_SIZE> {
        // Same capacity on both sides, so nothing is dropped here
        let drained = self.buffer.oldest_ordered().cloned().collect();
        self.buffer.clear();
        drained
    }

    /// Clear all messages. Does not reset the overflow count.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for RingBufferSink {
    fn default() -> Self {
        Self::new()
    }
}
