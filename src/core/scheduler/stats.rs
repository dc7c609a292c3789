//! Per-task statistics reports
//!
//! Snapshots of the statistics each task publishes, paired with the task's
//! identity, for end-of-run summaries and diagnostics.

use core::fmt;

use sound_trail_core::scheduler::{TaskParams, TaskStats};

use super::policy::PolicyOutcome;
use super::registry::TaskHandle;

/// Snapshot of one task's identity and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    pub handle: TaskHandle,
    pub params: TaskParams,
    pub outcome: PolicyOutcome,
    pub stats: TaskStats,
}

impl TaskReport {
    /// Fraction of checked iterations that missed their deadline, in percent
    pub fn miss_ratio_percent(&self) -> f32 {
        if self.stats.iterations == 0 {
            return 0.0;
        }
        self.stats.deadline_misses as f32 * 100.0 / self.stats.iterations as f32
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}) {} prio {}: woet {} ms, {} misses in {} iterations",
            self.handle.id(),
            self.params.name,
            self.params.priority,
            self.stats.woet_ms(),
            self.stats.deadline_misses,
            self.stats.iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(misses: u32, iterations: u64) -> TaskReport {
        TaskReport {
            handle: TaskHandle::from_index(2),
            params: TaskParams::new("consumer", 20, 20, 60),
            outcome: PolicyOutcome::BestEffort,
            stats: TaskStats {
                woet_us: 27_400,
                deadline_misses: misses,
                iterations,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            report(3, 50).to_string(),
            "2) consumer prio 60: woet 27 ms, 3 misses in 50 iterations"
        );
    }

    #[test]
    fn test_miss_ratio() {
        assert_eq!(report(0, 0).miss_ratio_percent(), 0.0);
        assert!((report(5, 20).miss_ratio_percent() - 25.0).abs() < f32::EPSILON);
    }
}
