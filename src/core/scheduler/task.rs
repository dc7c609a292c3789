//! Per-thread task context
//!
//! A `TaskContext` is handed to each task handler when its thread starts.
//! It owns the task's [`PeriodicTimer`] and is the only writer of the task's
//! statistics, so the activation and deadline bookkeeping needs no locking
//! beyond the short critical section that publishes the statistics for
//! other threads to read.

use std::sync::Arc;
use std::time::Duration;

use sound_trail_core::scheduler::{DeadlineStatus, PeriodicTimer, TaskParams, TaskStats};
use sound_trail_core::time::Timestamp;

use super::registry::TaskHandle;
use crate::core::traits::{Guarded, SharedState, TimeSource};
use crate::{log_debug, log_warn};

/// Activation and deadline API of one running task
pub struct TaskContext {
    handle: TaskHandle,
    params: TaskParams,
    timer: PeriodicTimer,
    clock: Arc<dyn TimeSource>,
    stats: Arc<Guarded<TaskStats>>,
}

impl TaskContext {
    pub(crate) fn new(
        handle: TaskHandle,
        params: TaskParams,
        clock: Arc<dyn TimeSource>,
        stats: Arc<Guarded<TaskStats>>,
    ) -> Self {
        Self {
            handle,
            params,
            timer: PeriodicTimer::from_params(&params),
            clock,
            stats,
        }
    }

    /// Dense scheduler id
    pub fn id(&self) -> usize {
        self.handle.id()
    }

    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    /// Application index supplied at registration
    pub fn user_id(&self) -> usize {
        self.params.user_id
    }

    pub fn name(&self) -> &'static str {
        self.params.name
    }

    pub fn params(&self) -> &TaskParams {
        &self.params
    }

    pub fn period(&self) -> Duration {
        self.params.period()
    }

    /// Clock shared by every task of the scheduler
    pub fn clock(&self) -> &dyn TimeSource {
        &*self.clock
    }

    /// Absolute time of the next release, once activated
    pub fn next_activation(&self) -> Option<Timestamp> {
        self.timer.next_activation()
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    /// Start the periodic sequence at the current time.
    ///
    /// Call once before the main loop.
    pub fn activate(&mut self) {
        let now = self.clock.now();
        self.timer.activate(now);
        log_debug!(
            "{}) {} activated, period {} ms, deadline {} ms",
            self.id(),
            self.name(),
            self.params.period_ms,
            self.params.deadline_ms
        );
    }

    /// Sleep until the next absolute activation time, then advance it.
    ///
    /// Call once per iteration, after [`check_deadline`]. A task that was
    /// never activated is activated here instead, without sleeping.
    ///
    /// [`check_deadline`]: TaskContext::check_deadline
    pub fn wait_for_activation(&mut self) {
        if !self.timer.is_active() {
            log_warn!(
                "{}) {} waited for activation before activate(); starting now",
                self.id(),
                self.name()
            );
        }
        self.timer.wait(&*self.clock);
    }

    /// Compare the current time with this iteration's absolute deadline.
    ///
    /// Updates the WOET and miss count, and logs a warning on a miss.
    pub fn check_deadline(&mut self) -> DeadlineStatus {
        let now = self.clock.now();
        let timer = &self.timer;
        let (status, woet_ms) = self.stats.with_mut(|stats| {
            let status = timer.check_deadline(now, stats);
            (status, stats.woet_ms())
        });

        if status.is_missed() {
            log_warn!(
                "{}) {}: deadline missed! woet: {} ms",
                self.id(),
                self.name(),
                woet_ms
            );
        }
        status
    }

    /// Worst observed execution time so far, in milliseconds
    pub fn woet_ms(&self) -> u64 {
        self.stats.with(|stats| stats.woet_ms())
    }

    pub fn deadline_misses(&self) -> u32 {
        self.stats.with(|stats| stats.deadline_misses)
    }

    /// Copy of this task's statistics
    pub fn stats(&self) -> TaskStats {
        self.stats.get()
    }
}
