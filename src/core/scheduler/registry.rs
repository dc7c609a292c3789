//! Task registry and thread creation
//!
//! The `Scheduler` owns one entry per registered task: its parameters, its
//! published statistics and the join handle of its OS thread. Entries are
//! appended on successful creation only, so task ids stay dense and a
//! [`TaskHandle`] is never handed out for a task that did not start.

use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use sound_trail_core::scheduler::{SchedulerStats, TaskParams, TaskStats};

use super::error::SchedulerError;
use super::policy::{PolicyOutcome, SchedPolicy};
use super::stats::TaskReport;
use super::task::TaskContext;
use crate::core::traits::{Guarded, MonotonicClock, TimeSource};
use crate::{log_debug, log_error, log_warn};

/// Opaque, stable handle of a registered task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(usize);

impl TaskHandle {
    pub(crate) const fn from_index(id: usize) -> Self {
        Self(id)
    }

    /// Dense id assigned at creation
    pub const fn id(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One registered task
struct TaskEntry {
    params: TaskParams,
    stats: Arc<Guarded<TaskStats>>,
    outcome: PolicyOutcome,
    thread: Option<JoinHandle<()>>,
}

/// Registry of periodic tasks, one OS thread each.
///
/// # Example
///
/// ```
/// use sound_trail::core::scheduler::{SchedPolicy, Scheduler};
/// use sound_trail_core::scheduler::TaskParams;
///
/// let mut scheduler = Scheduler::new(SchedPolicy::BestEffort);
/// let handle = scheduler
///     .create(TaskParams::new("blink", 10, 10, 20), |mut ctx| {
///         ctx.activate();
///         for _ in 0..3 {
///             ctx.check_deadline();
///             ctx.wait_for_activation();
///         }
///     })
///     .unwrap();
///
/// scheduler.wait_all().unwrap();
/// assert_eq!(scheduler.stats(handle).unwrap().iterations, 3);
/// ```
pub struct Scheduler {
    policy: SchedPolicy,
    clock: Arc<dyn TimeSource>,
    tasks: Vec<TaskEntry>,
    fallback_reported: bool,
}

impl Scheduler {
    /// Scheduler on the OS monotonic clock.
    pub fn new(policy: SchedPolicy) -> Self {
        Self::with_clock(policy, Arc::new(MonotonicClock::new()))
    }

    /// Scheduler on a caller-supplied clock, shared by every task.
    pub fn with_clock(policy: SchedPolicy, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            policy,
            clock,
            tasks: Vec::new(),
            fallback_reported: false,
        }
    }

    pub fn policy(&self) -> SchedPolicy {
        self.policy
    }

    pub fn clock(&self) -> Arc<dyn TimeSource> {
        Arc::clone(&self.clock)
    }

    /// Validate `params`, start a thread for `handler` and register it.
    ///
    /// The new thread applies the scheduling policy first and reports back;
    /// the handler only runs once creation has succeeded. Nothing is
    /// registered and no handler runs when an error is returned.
    pub fn create<F>(&mut self, params: TaskParams, handler: F) -> Result<TaskHandle, SchedulerError>
    where
        F: FnOnce(TaskContext) + Send + 'static,
    {
        params.validate()?;

        let (min, max) = self.policy.priority_range();
        if params.priority < min || params.priority > max {
            return Err(SchedulerError::PriorityOutOfRange {
                priority: params.priority,
                min,
                max,
            });
        }

        let handle = TaskHandle::from_index(self.tasks.len());
        let stats = Arc::new(Guarded::new(TaskStats::default()));
        let ctx = TaskContext::new(handle, params, Arc::clone(&self.clock), Arc::clone(&stats));
        let policy = self.policy;
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let thread = thread::Builder::new()
            .name(params.name.to_string())
            .spawn(move || {
                let applied = policy.apply_to_current_thread(params.priority);
                let proceed = applied.is_ok();
                // The receiver outlives this send: create() blocks on it
                let _ = ready_tx.send(applied);
                if proceed {
                    handler(ctx);
                }
            })
            .map_err(|source| SchedulerError::CreateFailed {
                name: params.name,
                source,
            })?;

        let outcome = match ready_rx.recv() {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(errno)) => {
                let _ = thread.join();
                return Err(SchedulerError::SchedulingDenied {
                    name: params.name,
                    errno,
                });
            }
            Err(_) => {
                let _ = thread.join();
                return Err(SchedulerError::CreateFailed {
                    name: params.name,
                    source: std::io::Error::other("task thread exited during start-up"),
                });
            }
        };

        if let PolicyOutcome::FellBack { errno } = outcome {
            if !self.fallback_reported {
                log_warn!(
                    "real-time scheduling unavailable (errno {}), tasks run best-effort",
                    errno
                );
                self.fallback_reported = true;
            }
        }

        log_debug!(
            "created task {} {} (period {} ms, deadline {} ms, priority {}, {:?})",
            handle,
            params.name,
            params.period_ms,
            params.deadline_ms,
            params.priority,
            outcome
        );

        self.tasks.push(TaskEntry {
            params,
            stats,
            outcome,
            thread: Some(thread),
        });
        Ok(handle)
    }

    /// Block until every task thread has returned.
    ///
    /// All threads are joined even when some fail; the first failure is
    /// returned and every failure is logged.
    pub fn wait_all(&mut self) -> Result<(), SchedulerError> {
        let mut first_error = None;

        for (id, entry) in self.tasks.iter_mut().enumerate() {
            let Some(thread) = entry.thread.take() else {
                continue;
            };
            if thread.join().is_err() {
                log_error!("{}) {} terminated abnormally", id, entry.params.name);
                first_error.get_or_insert(SchedulerError::JoinFailed {
                    id,
                    name: entry.params.name,
                });
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn entry(&self, handle: TaskHandle) -> Result<&TaskEntry, SchedulerError> {
        self.tasks
            .get(handle.id())
            .ok_or(SchedulerError::UnknownTask(handle.id()))
    }

    /// Handle for a dense id, if registered
    pub fn handle(&self, id: usize) -> Option<TaskHandle> {
        (id < self.tasks.len()).then_some(TaskHandle::from_index(id))
    }

    /// First task registered under `name`
    pub fn find_by_name(&self, name: &str) -> Option<TaskHandle> {
        self.tasks
            .iter()
            .position(|entry| entry.params.name == name)
            .map(TaskHandle::from_index)
    }

    pub fn params(&self, handle: TaskHandle) -> Result<TaskParams, SchedulerError> {
        self.entry(handle).map(|entry| entry.params)
    }

    /// Scheduling policy actually in effect for the task
    pub fn policy_outcome(&self, handle: TaskHandle) -> Result<PolicyOutcome, SchedulerError> {
        self.entry(handle).map(|entry| entry.outcome)
    }

    /// Copy of a task's statistics
    pub fn stats(&self, handle: TaskHandle) -> Result<TaskStats, SchedulerError> {
        self.entry(handle).map(|entry| entry.stats.get())
    }

    pub fn worst_observed_exec_time_ms(&self, handle: TaskHandle) -> Result<u64, SchedulerError> {
        self.stats(handle).map(|stats| stats.woet_ms())
    }

    pub fn deadline_misses(&self, handle: TaskHandle) -> Result<u32, SchedulerError> {
        self.stats(handle).map(|stats| stats.deadline_misses)
    }

    /// Iterate over `(handle, stats)` for every registered task
    pub fn iter_stats(&self) -> impl Iterator<Item = (TaskHandle, TaskStats)> + '_ {
        self.tasks
            .iter()
            .enumerate()
            .map(|(id, entry)| (TaskHandle::from_index(id), entry.stats.get()))
    }

    /// Aggregate over every registered task
    pub fn scheduler_stats(&self) -> SchedulerStats {
        let snapshot: Vec<TaskStats> = self.iter_stats().map(|(_, stats)| stats).collect();
        SchedulerStats::aggregate(&snapshot)
    }

    /// Per-task summary, in creation order
    pub fn reports(&self) -> Vec<TaskReport> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(id, entry)| TaskReport {
                handle: TaskHandle::from_index(id),
                params: entry.params,
                outcome: entry.outcome,
                stats: entry.stats.get(),
            })
            .collect()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("policy", &self.policy)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use sound_trail_core::scheduler::TaskConfigError;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_rejects_deadline_longer_than_period() {
        let mut scheduler = Scheduler::new(SchedPolicy::BestEffort);
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        let result = scheduler.create(TaskParams::new("bad", 20, 30, 10), move |_| {
            flag.store(true, Ordering::SeqCst);
        });

        assert!(matches!(
            result,
            Err(SchedulerError::InvalidParams(
                TaskConfigError::DeadlineExceedsPeriod { .. }
            ))
        ));
        assert!(scheduler.is_empty());
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_rejects_priority_out_of_range() {
        let mut scheduler = Scheduler::new(SchedPolicy::BestEffort);
        let result = scheduler.create(TaskParams::new("hot", 10, 10, 150), |_| {});

        assert!(matches!(
            result,
            Err(SchedulerError::PriorityOutOfRange {
                priority: 150,
                min: 0,
                max: 99
            })
        ));
        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn test_unknown_handle() {
        let scheduler = Scheduler::new(SchedPolicy::BestEffort);
        let ghost = TaskHandle::from_index(4);
        assert!(matches!(
            scheduler.stats(ghost),
            Err(SchedulerError::UnknownTask(4))
        ));
        assert_eq!(scheduler.handle(0), None);
    }

    #[test]
    #[serial]
    fn test_ids_are_dense_and_stable() {
        let mut scheduler = Scheduler::new(SchedPolicy::BestEffort);

        let a = scheduler.create(TaskParams::new("a", 10, 10, 1), |_| {}).unwrap();
        assert!(scheduler.create(TaskParams::new("b", 0, 0, 1), |_| {}).is_err());
        let c = scheduler.create(TaskParams::new("c", 10, 10, 1), |_| {}).unwrap();

        assert_eq!(a.id(), 0);
        assert_eq!(c.id(), 1);
        assert_eq!(scheduler.find_by_name("c"), Some(c));
        assert_eq!(scheduler.policy_outcome(a).unwrap(), PolicyOutcome::BestEffort);
        scheduler.wait_all().unwrap();
    }

    #[test]
    #[serial]
    fn test_wait_all_reports_panicked_task() {
        let mut scheduler = Scheduler::new(SchedPolicy::BestEffort);

        scheduler.create(TaskParams::new("fine", 10, 10, 1), |_| {}).unwrap();
        scheduler
            .create(TaskParams::new("broken", 10, 10, 1), |_| {
                panic!("handler failure");
            })
            .unwrap();

        match scheduler.wait_all() {
            Err(SchedulerError::JoinFailed { id, name }) => {
                assert_eq!(id, 1);
                assert_eq!(name, "broken");
            }
            other => panic!("expected JoinFailed, got {:?}", other),
        }

        // Every thread was joined: a second call has nothing left to do
        assert!(scheduler.wait_all().is_ok());
    }

    #[test]
    #[serial]
    fn test_handler_sees_its_own_context() {
        let mut scheduler = Scheduler::new(SchedPolicy::BestEffort);
        let seen = Arc::new(Guarded::new(None));
        let out = Arc::clone(&seen);

        let handle = scheduler
            .create(
                TaskParams::new("consumer", 20, 20, 60).with_user_id(5),
                move |ctx| out.set(Some((ctx.id(), ctx.user_id(), ctx.name()))),
            )
            .unwrap();
        scheduler.wait_all().unwrap();

        assert_eq!(seen.get(), Some((handle.id(), 5, "consumer")));
    }

    #[test]
    #[serial]
    fn test_periodic_task_statistics() {
        let mut scheduler = Scheduler::new(SchedPolicy::BestEffort);

        let handle = scheduler
            .create(TaskParams::new("ticker", 10, 10, 1), |mut ctx| {
                ctx.activate();
                for _ in 0..5 {
                    ctx.check_deadline();
                    ctx.wait_for_activation();
                }
            })
            .unwrap();
        scheduler.wait_all().unwrap();

        let stats = scheduler.stats(handle).unwrap();
        assert_eq!(stats.iterations, 5);
        assert_eq!(scheduler.deadline_misses(handle).unwrap(), stats.deadline_misses);
        assert!(scheduler.worst_observed_exec_time_ms(handle).unwrap() <= 10);

        let total = scheduler.scheduler_stats();
        assert_eq!(total.task_count, 1);
        assert_eq!(scheduler.reports()[0].params.name, "ticker");
    }
}
