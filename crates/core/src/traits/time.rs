//! Time abstraction traits for platform-agnostic timing operations.
//!
//! This module provides the `TimeSource` trait that abstracts over the
//! monotonic clock used by periodic tasks, so the activation and deadline
//! arithmetic can be tested on host with a controllable clock.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;

use crate::time::Timestamp;

/// Monotonic time source for periodic activation.
///
/// This trait abstracts over different time providers:
/// - `MonotonicClock` (in the runtime crate) backed by `CLOCK_MONOTONIC`
/// - `MockTime` for host testing with controllable time
///
/// The trait is object safe so a scheduler can share one clock between all
/// of its task threads as `Arc<dyn TimeSource>`.
///
/// # Example
///
/// ```
/// use sound_trail_core::time::Timestamp;
/// use sound_trail_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let target = time.now().add_ms(20);
/// time.sleep_until(target);
/// assert_eq!(time.now(), target);
/// ```
pub trait TimeSource: Send + Sync {
    /// Current time on the monotonic axis.
    fn now(&self) -> Timestamp;

    /// Block the calling thread until the absolute time `deadline`.
    ///
    /// Returns immediately when `deadline` has already passed.
    fn sleep_until(&self, deadline: Timestamp);

    /// Current time in milliseconds.
    fn now_ms(&self) -> u64 {
        self.now().as_millis()
    }

    /// Current time in microseconds.
    fn now_us(&self) -> u64 {
        self.now().as_micros()
    }

    /// Time elapsed since a reference point, saturating at zero.
    fn elapsed_since(&self, reference: Timestamp) -> Duration {
        self.now().diff(reference)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source with controllable time advancement.
///
/// `sleep_until` never blocks: it moves the clock forward to the requested
/// instant (or leaves it alone when that instant is already in the past),
/// which makes a periodic loop driven by `MockTime` run instantly while
/// still producing the exact timestamps a real clock would.
///
/// # Example
///
/// ```
/// use sound_trail_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_us(), 0);
///
/// time.advance_ms(1);
/// assert_eq!(time.now_us(), 1000);
/// assert_eq!(time.now_ms(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockTime {
    current_ns: AtomicU64,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub const fn new() -> Self {
        Self {
            current_ns: AtomicU64::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub const fn with_initial(start: Timestamp) -> Self {
        Self {
            current_ns: AtomicU64::new(start.as_nanos()),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, t: Timestamp) {
        self.current_ns.store(t.as_nanos(), Ordering::SeqCst);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, d: Duration) {
        let ns = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
        self.current_ns.fetch_add(ns, Ordering::SeqCst);
    }

    /// Advances the current time by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl TimeSource for MockTime {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.current_ns.load(Ordering::SeqCst))
    }

    fn sleep_until(&self, deadline: Timestamp) {
        self.current_ns
            .fetch_max(deadline.as_nanos(), Ordering::SeqCst);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_initial_value() {
        let time = MockTime::new();
        assert_eq!(time.now(), Timestamp::ZERO);
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_with_initial() {
        let time = MockTime::with_initial(Timestamp::from_millis(5000));
        assert_eq!(time.now_us(), 5_000_000);
        assert_eq!(time.now_ms(), 5000);
    }

    #[test]
    fn mock_time_advance() {
        let time = MockTime::new();
        time.advance_ms(500);
        time.advance(Duration::from_micros(500_000));
        assert_eq!(time.now_ms(), 1000);
    }

    #[test]
    fn sleep_until_moves_forward_only() {
        let time = MockTime::with_initial(Timestamp::from_millis(100));

        time.sleep_until(Timestamp::from_millis(120));
        assert_eq!(time.now(), Timestamp::from_millis(120));

        // Already past: the clock must not go backwards
        time.sleep_until(Timestamp::from_millis(110));
        assert_eq!(time.now(), Timestamp::from_millis(120));
    }

    #[test]
    fn mock_time_elapsed_since_saturates() {
        let time = MockTime::with_initial(Timestamp::from_millis(1));
        assert_eq!(
            time.elapsed_since(Timestamp::from_millis(5)),
            Duration::ZERO
        );
        assert_eq!(
            time.elapsed_since(Timestamp::ZERO),
            Duration::from_millis(1)
        );
    }
}
