//! Core types for the periodic task scheduler
//!
//! This module defines the fundamental types used by the task scheduler:
//! - Task parameters (registration-time configuration)
//! - Task statistics (runtime monitoring)
//! - Scheduler statistics (global metrics)

use core::fmt;
use core::time::Duration;

/// Task parameters supplied at registration time
///
/// Each task in the scheduler has associated parameters that define its
/// timing characteristics. They are immutable once the task is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskParams {
    /// Human-readable task name for logging and debugging
    pub name: &'static str,

    /// Nominal time between consecutive activations, in milliseconds
    pub period_ms: u32,

    /// Relative deadline in milliseconds
    ///
    /// Maximum time from activation to completion of one iteration. Must not
    /// exceed `period_ms`.
    pub deadline_ms: u32,

    /// Fixed priority (higher = preferred)
    ///
    /// Under a real-time policy this is the OS priority of the task thread;
    /// under best-effort scheduling it is only a hint.
    pub priority: u8,

    /// Application-defined index, for example the band a worker owns
    ///
    /// Independent of the dense id the scheduler assigns.
    pub user_id: usize,
}

impl TaskParams {
    /// Parameters with `user_id` 0.
    pub const fn new(name: &'static str, period_ms: u32, deadline_ms: u32, priority: u8) -> Self {
        Self {
            name,
            period_ms,
            deadline_ms,
            priority,
            user_id: 0,
        }
    }

    /// Same parameters with a different application index.
    pub const fn with_user_id(mut self, user_id: usize) -> Self {
        self.user_id = user_id;
        self
    }

    /// Task period as a `Duration`
    #[inline]
    pub const fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms as u64)
    }

    /// Relative deadline as a `Duration`
    #[inline]
    pub const fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms as u64)
    }

    /// Check if an execution time fits inside the relative deadline
    #[inline]
    pub fn is_within_deadline(&self, execution: Duration) -> bool {
        execution <= self.deadline()
    }

    /// Check the registration preconditions that do not depend on the OS.
    pub fn validate(&self) -> Result<(), TaskConfigError> {
        if self.name.is_empty() {
            return Err(TaskConfigError::EmptyName);
        }
        if self.period_ms == 0 {
            return Err(TaskConfigError::ZeroPeriod);
        }
        if self.deadline_ms == 0 {
            return Err(TaskConfigError::ZeroDeadline);
        }
        if self.deadline_ms > self.period_ms {
            return Err(TaskConfigError::DeadlineExceedsPeriod {
                deadline_ms: self.deadline_ms,
                period_ms: self.period_ms,
            });
        }
        Ok(())
    }
}

/// Rejected task parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskConfigError {
    /// Task name is empty
    EmptyName,
    /// Period of zero milliseconds
    ZeroPeriod,
    /// Relative deadline of zero milliseconds
    ZeroDeadline,
    /// Relative deadline longer than the period
    DeadlineExceedsPeriod { deadline_ms: u32, period_ms: u32 },
}

impl fmt::Display for TaskConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskConfigError::EmptyName => write!(f, "task name is empty"),
            TaskConfigError::ZeroPeriod => write!(f, "task period must be non-zero"),
            TaskConfigError::ZeroDeadline => write!(f, "task deadline must be non-zero"),
            TaskConfigError::DeadlineExceedsPeriod {
                deadline_ms,
                period_ms,
            } => write!(
                f,
                "deadline {} ms exceeds period {} ms",
                deadline_ms, period_ms
            ),
        }
    }
}

/// Outcome of a per-iteration deadline check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    /// Iteration completed at or before its absolute deadline
    Ok,
    /// Iteration completed after its absolute deadline
    Missed,
}

impl DeadlineStatus {
    #[inline]
    pub fn is_missed(&self) -> bool {
        matches!(self, DeadlineStatus::Missed)
    }
}

/// Runtime statistics for a single task
///
/// Written only by the task's own thread (once per iteration) and copied out
/// for diagnostics by anyone else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Worst observed execution time (release to completion) in microseconds
    ///
    /// Never decreases over the lifetime of a task.
    pub woet_us: u64,

    /// Last execution time in microseconds
    pub last_execution_us: u64,

    /// Number of deadline misses
    pub deadline_misses: u32,

    /// Number of deadline checks performed (one per iteration)
    pub iterations: u64,
}

impl TaskStats {
    /// Update statistics with one iteration's measurement
    ///
    /// # Arguments
    ///
    /// * `execution` - Time from the iteration's release to the check
    /// * `status` - Result of the deadline comparison
    pub fn record(&mut self, execution: Duration, status: DeadlineStatus) {
        let execution_us = u64::try_from(execution.as_micros()).unwrap_or(u64::MAX);

        self.last_execution_us = execution_us;
        self.iterations = self.iterations.saturating_add(1);

        if execution_us > self.woet_us {
            self.woet_us = execution_us;
        }

        if status.is_missed() {
            self.deadline_misses = self.deadline_misses.saturating_add(1);
        }
    }

    /// Worst observed execution time in whole milliseconds
    #[inline]
    pub fn woet_ms(&self) -> u64 {
        self.woet_us / 1000
    }

    /// Reset all statistics to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Global scheduler statistics
///
/// Aggregated view over every registered task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Number of registered tasks
    pub task_count: usize,

    /// Total deadline misses across all tasks
    pub total_deadline_misses: u32,

    /// Largest WOET of any task in microseconds
    pub worst_woet_us: u64,
}

impl SchedulerStats {
    /// Rebuild the aggregate from per-task statistics
    pub fn aggregate<'a, I>(task_stats: I) -> Self
    where
        I: IntoIterator<Item = &'a TaskStats>,
    {
        let mut out = Self::default();
        for stats in task_stats {
            out.task_count += 1;
            out.total_deadline_misses = out
                .total_deadline_misses
                .saturating_add(stats.deadline_misses);
            out.worst_woet_us = out.worst_woet_us.max(stats.woet_us);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_params_validation() {
        let ok = TaskParams::new("producer", 20, 20, 90);
        assert_eq!(ok.validate(), Ok(()));

        let late = TaskParams::new("producer", 20, 30, 90);
        assert_eq!(
            late.validate(),
            Err(TaskConfigError::DeadlineExceedsPeriod {
                deadline_ms: 30,
                period_ms: 20
            })
        );

        assert_eq!(
            TaskParams::new("", 20, 20, 1).validate(),
            Err(TaskConfigError::EmptyName)
        );
        assert_eq!(
            TaskParams::new("t", 0, 0, 1).validate(),
            Err(TaskConfigError::ZeroPeriod)
        );
        assert_eq!(
            TaskParams::new("t", 10, 0, 1).validate(),
            Err(TaskConfigError::ZeroDeadline)
        );
    }

    #[test]
    fn test_task_params_deadline_check() {
        let task = TaskParams::new("consumer", 20, 15, 60).with_user_id(3);

        assert_eq!(task.user_id, 3);
        assert!(task.is_within_deadline(Duration::from_millis(15)));
        assert!(!task.is_within_deadline(Duration::from_micros(15_001)));
    }

    #[test]
    fn test_task_stats_record() {
        let mut stats = TaskStats::default();

        stats.record(Duration::from_micros(1500), DeadlineStatus::Ok);
        assert_eq!(stats.last_execution_us, 1500);
        assert_eq!(stats.woet_us, 1500);
        assert_eq!(stats.deadline_misses, 0);
        assert_eq!(stats.iterations, 1);

        // Shorter run: WOET keeps the maximum
        stats.record(Duration::from_micros(900), DeadlineStatus::Ok);
        assert_eq!(stats.last_execution_us, 900);
        assert_eq!(stats.woet_us, 1500);

        stats.record(Duration::from_millis(25), DeadlineStatus::Missed);
        assert_eq!(stats.woet_ms(), 25);
        assert_eq!(stats.deadline_misses, 1);
        assert_eq!(stats.iterations, 3);

        stats.reset();
        assert_eq!(stats, TaskStats::default());
    }

    #[test]
    fn test_scheduler_stats_aggregate() {
        let task_stats = [
            TaskStats {
                deadline_misses: 5,
                woet_us: 100,
                ..Default::default()
            },
            TaskStats {
                deadline_misses: 3,
                woet_us: 4_000,
                ..Default::default()
            },
            TaskStats::default(),
        ];

        let stats = SchedulerStats::aggregate(&task_stats);
        assert_eq!(stats.task_count, 3);
        assert_eq!(stats.total_deadline_misses, 8);
        assert_eq!(stats.worst_woet_us, 4_000);
    }

    #[test]
    fn test_config_error_display() {
        let err = TaskConfigError::DeadlineExceedsPeriod {
            deadline_ms: 30,
            period_ms: 20,
        };
        assert_eq!(format!("{}", err), "deadline 30 ms exceeds period 20 ms");
    }
}
