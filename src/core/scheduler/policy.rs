//! OS scheduling policy for task threads.
//!
//! Tasks run under fixed-priority round-robin (`SCHED_RR`) when the process
//! is allowed to use it. Real-time policies need elevated privilege on most
//! systems, so the policy is a configuration choice with an explicit
//! best-effort fallback instead of a hard requirement.
//!
//! # Platform Support
//!
//! - **Unix**: `pthread_setschedparam` on the calling thread
//! - **Other**: real-time requests report `ENOSYS`-style denial

use core::fmt;

/// Priority bounds used when the platform cannot be queried
const FALLBACK_RT_PRIORITY: (u8, u8) = (1, 99);

/// Priority bounds accepted under best-effort scheduling
const BEST_EFFORT_PRIORITY: (u8, u8) = (0, 99);

/// How task threads are scheduled by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedPolicy {
    /// `SCHED_RR` at the task priority; task creation fails if refused
    RoundRobin,
    /// `SCHED_RR` when permitted, otherwise the default policy with a warning
    #[default]
    RoundRobinOrBestEffort,
    /// Default OS policy; the priority is only a hint
    BestEffort,
}

/// What actually happened when a policy was applied to a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOutcome {
    /// Running under `SCHED_RR` at the requested priority
    RealTime,
    /// Real-time scheduling was refused; running best-effort
    FellBack { errno: i32 },
    /// Best-effort scheduling was requested
    BestEffort,
}

impl SchedPolicy {
    /// Parse the names accepted in configuration: `rr`,
    /// `rr-or-best-effort`, `best-effort`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rr" | "round-robin" => Some(SchedPolicy::RoundRobin),
            "rr-or-best-effort" => Some(SchedPolicy::RoundRobinOrBestEffort),
            "best-effort" | "other" => Some(SchedPolicy::BestEffort),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchedPolicy::RoundRobin => "rr",
            SchedPolicy::RoundRobinOrBestEffort => "rr-or-best-effort",
            SchedPolicy::BestEffort => "best-effort",
        }
    }

    /// Whether this policy asks the OS for real-time scheduling
    pub fn wants_real_time(&self) -> bool {
        !matches!(self, SchedPolicy::BestEffort)
    }

    /// Inclusive range of priorities a task may request under this policy.
    pub fn priority_range(&self) -> (u8, u8) {
        if self.wants_real_time() {
            rr_priority_range()
        } else {
            BEST_EFFORT_PRIORITY
        }
    }

    /// Apply the policy to the calling thread.
    ///
    /// Returns the OS error number when a strict real-time request is
    /// refused.
    pub fn apply_to_current_thread(&self, priority: u8) -> Result<PolicyOutcome, i32> {
        match self {
            SchedPolicy::BestEffort => Ok(PolicyOutcome::BestEffort),
            SchedPolicy::RoundRobin => {
                set_current_thread_rr(priority).map(|()| PolicyOutcome::RealTime)
            }
            SchedPolicy::RoundRobinOrBestEffort => match set_current_thread_rr(priority) {
                Ok(()) => Ok(PolicyOutcome::RealTime),
                Err(errno) => Ok(PolicyOutcome::FellBack { errno }),
            },
        }
    }
}

impl fmt::Display for SchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(unix)]
fn rr_priority_range() -> (u8, u8) {
    // SAFETY: plain queries without pointer arguments
    let (min, max) = unsafe {
        (
            libc::sched_get_priority_min(libc::SCHED_RR),
            libc::sched_get_priority_max(libc::SCHED_RR),
        )
    };
    match (u8::try_from(min), u8::try_from(max)) {
        (Ok(min), Ok(max)) if min <= max => (min, max),
        _ => FALLBACK_RT_PRIORITY,
    }
}

#[cfg(not(unix))]
fn rr_priority_range() -> (u8, u8) {
    FALLBACK_RT_PRIORITY
}

#[cfg(unix)]
fn set_current_thread_rr(priority: u8) -> Result<(), i32> {
    // SAFETY:
    // - sched_param is valid when zeroed
    // - pthread_setschedparam returns error codes directly (not via errno)
    unsafe {
        let mut param: libc::sched_param = std::mem::zeroed();
        param.sched_priority = libc::c_int::from(priority);

        let rc = libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_RR, &param);
        if rc != 0 {
            return Err(rc);
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_current_thread_rr(_priority: u8) -> Result<(), i32> {
    Err(38) // ENOSYS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for policy in [
            SchedPolicy::RoundRobin,
            SchedPolicy::RoundRobinOrBestEffort,
            SchedPolicy::BestEffort,
        ] {
            assert_eq!(SchedPolicy::from_name(policy.name()), Some(policy));
        }
        assert_eq!(SchedPolicy::from_name(" RR "), Some(SchedPolicy::RoundRobin));
        assert_eq!(SchedPolicy::from_name("fifo"), None);
    }

    #[test]
    fn test_default_falls_back() {
        assert_eq!(SchedPolicy::default(), SchedPolicy::RoundRobinOrBestEffort);
    }

    #[test]
    fn test_best_effort_never_touches_the_thread() {
        assert_eq!(
            SchedPolicy::BestEffort.apply_to_current_thread(99),
            Ok(PolicyOutcome::BestEffort)
        );
        assert_eq!(SchedPolicy::BestEffort.priority_range(), (0, 99));
    }

    #[test]
    fn test_real_time_range_is_sane() {
        let (min, max) = SchedPolicy::RoundRobin.priority_range();
        assert!(min >= 1);
        assert!(min <= max);
    }

    #[test]
    fn test_fallback_policy_never_fails() {
        // Works with or without real-time privilege
        let outcome = std::thread::spawn(|| {
            SchedPolicy::RoundRobinOrBestEffort.apply_to_current_thread(1)
        })
        .join()
        .unwrap();
        assert!(matches!(
            outcome,
            Ok(PolicyOutcome::RealTime) | Ok(PolicyOutcome::FellBack { .. })
        ));
    }
}
