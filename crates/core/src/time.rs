//! Absolute time values on a monotonic axis
//!
//! `Timestamp` is the unit every periodic-task computation works in. It is a
//! plain nanosecond count from an arbitrary origin (for the runtime clock this
//! is the `CLOCK_MONOTONIC` origin), so comparisons are total and additions
//! never have to normalize a seconds/nanoseconds pair by hand.

use core::time::Duration;

/// Nanoseconds per millisecond
pub const NANOS_PER_MS: u64 = 1_000_000;

/// Nanoseconds per microsecond
pub const NANOS_PER_US: u64 = 1_000;

/// Nanoseconds per second
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point in time on a monotonic axis, with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// The axis origin.
    pub const ZERO: Timestamp = Timestamp { nanos: 0 };

    /// Build a timestamp from a raw nanosecond count.
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Build a timestamp from whole milliseconds.
    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self {
            nanos: ms.saturating_mul(NANOS_PER_MS),
        }
    }

    /// Build a timestamp from a `(seconds, nanoseconds)` pair as returned by
    /// `clock_gettime`.
    #[inline]
    pub const fn from_secs_nanos(secs: u64, nanos: u32) -> Self {
        Self {
            nanos: secs.saturating_mul(NANOS_PER_SEC).saturating_add(nanos as u64),
        }
    }

    /// Raw nanosecond count.
    #[inline]
    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }

    /// Whole microseconds, rounded down.
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.nanos / NANOS_PER_US
    }

    /// Whole milliseconds, rounded down.
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.nanos / NANOS_PER_MS
    }

    /// Split into `(seconds, nanoseconds)`, the layout of a `timespec`.
    #[inline]
    pub const fn to_secs_nanos(&self) -> (u64, u32) {
        (self.nanos / NANOS_PER_SEC, (self.nanos % NANOS_PER_SEC) as u32)
    }

    /// Return this timestamp moved forward by `ms` milliseconds.
    #[inline]
    pub const fn add_ms(self, ms: u64) -> Self {
        Self {
            nanos: self.nanos.saturating_add(ms.saturating_mul(NANOS_PER_MS)),
        }
    }

    /// Return this timestamp moved backward by `ms` milliseconds, stopping at
    /// the origin.
    #[inline]
    pub const fn sub_ms(self, ms: u64) -> Self {
        Self {
            nanos: self.nanos.saturating_sub(ms.saturating_mul(NANOS_PER_MS)),
        }
    }

    /// Return this timestamp moved forward by `d`.
    #[inline]
    pub fn add_duration(self, d: Duration) -> Self {
        let extra = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
        Self {
            nanos: self.nanos.saturating_add(extra),
        }
    }

    /// Time elapsed from `earlier` to `self`.
    ///
    /// Clamps to zero when `earlier` is actually later, so a late wakeup can
    /// never produce a negative (wrapped) interval.
    #[inline]
    pub fn diff(self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(earlier.nanos))
    }

    /// `true` when `self` lies strictly after `other`.
    #[inline]
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.nanos > other.nanos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ms_carries_into_seconds() {
        let t = Timestamp::from_secs_nanos(1, 999_500_000);
        let later = t.add_ms(1);
        assert_eq!(later.to_secs_nanos(), (2, 500_000));
    }

    #[test]
    fn add_ms_whole_seconds() {
        let t = Timestamp::from_secs_nanos(3, 250);
        assert_eq!(t.add_ms(2_000).to_secs_nanos(), (5, 250));
    }

    #[test]
    fn ordering_compares_seconds_then_nanos() {
        let a = Timestamp::from_secs_nanos(1, 900);
        let b = Timestamp::from_secs_nanos(2, 100);
        assert!(a < b);
        assert!(b.is_after(a));
        assert!(!a.is_after(a));
    }

    #[test]
    fn diff_is_clamped_to_zero() {
        let early = Timestamp::from_millis(10);
        let late = Timestamp::from_millis(25);
        assert_eq!(late.diff(early), Duration::from_millis(15));
        assert_eq!(early.diff(late), Duration::ZERO);
    }

    #[test]
    fn millisecond_conversion_rounds_down() {
        let t = Timestamp::from_nanos(1_999_999);
        assert_eq!(t.as_millis(), 1);
        assert_eq!(t.as_micros(), 1_999);
    }

    #[test]
    fn sub_ms_stops_at_origin() {
        let t = Timestamp::from_millis(5);
        assert_eq!(t.sub_ms(3), Timestamp::from_millis(2));
        assert_eq!(t.sub_ms(30), Timestamp::ZERO);
    }
}
