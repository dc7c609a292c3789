//! OS-backed monotonic clock.
//!
//! `MonotonicClock` implements [`TimeSource`] for real task threads. On Linux
//! it reads `CLOCK_MONOTONIC` and sleeps with an absolute
//! `clock_nanosleep(TIMER_ABSTIME)`, so a periodic loop never accumulates the
//! error a relative sleep would add on every wakeup. Other platforms emulate
//! the absolute sleep with a relative one computed from the current time.

pub use sound_trail_core::traits::{MockTime, TimeSource};

use sound_trail_core::time::Timestamp;

/// Monotonic wall-independent clock for task activation.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "linux")]
mod imp {
    use super::Timestamp;

    pub fn now() -> Timestamp {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid, writable timespec.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        debug_assert_eq!(rc, 0, "CLOCK_MONOTONIC is always available on Linux");
        Timestamp::from_secs_nanos(ts.tv_sec as u64, ts.tv_nsec as u32)
    }

    pub fn sleep_until(deadline: Timestamp) {
        let (secs, nanos) = deadline.to_secs_nanos();
        let ts = libc::timespec {
            tv_sec: secs as libc::time_t,
            tv_nsec: nanos as libc::c_long,
        };
        loop {
            // SAFETY: `ts` is a valid timespec and the remainder pointer may
            // be null for absolute sleeps.
            let rc = unsafe {
                libc::clock_nanosleep(
                    libc::CLOCK_MONOTONIC,
                    libc::TIMER_ABSTIME,
                    &ts,
                    core::ptr::null_mut(),
                )
            };
            // Restart with the same absolute target after a signal
            if rc != libc::EINTR {
                break;
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use super::Timestamp;
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();

    pub fn now() -> Timestamp {
        let origin = *ORIGIN.get_or_init(Instant::now);
        Timestamp::from_nanos(u64::try_from(origin.elapsed().as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn sleep_until(deadline: Timestamp) {
        let remaining = deadline.diff(now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        imp::now()
    }

    fn sleep_until(&self, deadline: Timestamp) {
        imp::sleep_until(deadline)
    }
}
