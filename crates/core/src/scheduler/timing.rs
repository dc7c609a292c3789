//! Periodic activation and deadline bookkeeping
//!
//! `PeriodicTimer` is the per-task state machine behind `activate`,
//! `wait_for_activation` and `check_deadline`. It holds absolute timestamps
//! only and advances them by fixed increments, so the long-run period equals
//! the nominal one no matter how late individual iterations finish.
//!
//! ```text
//!   UNSTARTED --activate(now)--> ACTIVE --(sleep to next, advance)--> ACTIVE ...
//! ```
//!
//! The timer never sleeps by itself; the caller sleeps until
//! [`PeriodicTimer::next_activation`] and then calls
//! [`PeriodicTimer::advance`]. [`PeriodicTimer::wait`] bundles both steps
//! for any [`TimeSource`].

use super::types::{DeadlineStatus, TaskParams, TaskStats};
use crate::time::Timestamp;
use crate::traits::TimeSource;

/// Activation state of one periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// `activate` has not been called yet
    Unstarted,
    /// Released at least once
    Active {
        /// Absolute time of the next release
        next_activation: Timestamp,
        /// Absolute deadline of the current iteration
        absolute_deadline: Timestamp,
    },
}

/// Drift-free periodic timer for a single task
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTimer {
    period_ms: u64,
    deadline_ms: u64,
    state: ActivationState,
}

impl PeriodicTimer {
    /// Timer for the given period and relative deadline, in milliseconds.
    pub const fn new(period_ms: u32, deadline_ms: u32) -> Self {
        Self {
            period_ms: period_ms as u64,
            deadline_ms: deadline_ms as u64,
            state: ActivationState::Unstarted,
        }
    }

    /// Timer configured from registration parameters.
    pub const fn from_params(params: &TaskParams) -> Self {
        Self::new(params.period_ms, params.deadline_ms)
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ActivationState::Active { .. })
    }

    /// First release: the current iteration starts at `now`.
    ///
    /// Calling it again restarts the sequence from the new `now`.
    pub fn activate(&mut self, now: Timestamp) {
        self.state = ActivationState::Active {
            next_activation: now.add_ms(self.period_ms),
            absolute_deadline: now.add_ms(self.deadline_ms),
        };
    }

    /// Absolute time the task must sleep until, or `None` before activation.
    pub fn next_activation(&self) -> Option<Timestamp> {
        match self.state {
            ActivationState::Active {
                next_activation, ..
            } => Some(next_activation),
            ActivationState::Unstarted => None,
        }
    }

    /// Absolute deadline of the current iteration, or `None` before activation.
    pub fn absolute_deadline(&self) -> Option<Timestamp> {
        match self.state {
            ActivationState::Active {
                absolute_deadline, ..
            } => Some(absolute_deadline),
            ActivationState::Unstarted => None,
        }
    }

    /// Release time of the current iteration (the previous activation point).
    pub fn current_release(&self) -> Option<Timestamp> {
        self.next_activation().map(|next| next.sub_ms(self.period_ms))
    }

    /// Step to the next iteration after the sleep target was reached.
    ///
    /// Both absolute times move by exactly one increment, whether or not the
    /// previous iteration overran. Returns the activation time that was just
    /// consumed, or `None` before activation.
    pub fn advance(&mut self) -> Option<Timestamp> {
        match self.state {
            ActivationState::Active {
                next_activation,
                absolute_deadline,
            } => {
                self.state = ActivationState::Active {
                    next_activation: next_activation.add_ms(self.period_ms),
                    absolute_deadline: absolute_deadline.add_ms(self.deadline_ms),
                };
                Some(next_activation)
            }
            ActivationState::Unstarted => None,
        }
    }

    /// Sleep on `clock` until the next activation, then advance.
    ///
    /// An unstarted timer is activated at the current time instead, so the
    /// first iteration begins immediately. Returns the activation time that
    /// was waited for.
    pub fn wait<C: TimeSource + ?Sized>(&mut self, clock: &C) -> Timestamp {
        match self.next_activation() {
            Some(target) => {
                clock.sleep_until(target);
                self.advance();
                target
            }
            None => {
                let now = clock.now();
                self.activate(now);
                now
            }
        }
    }

    /// Compare `now` against the current absolute deadline and update `stats`.
    ///
    /// Returns `Missed` exactly when `now` is strictly after the absolute
    /// deadline. The elapsed time from the current release is folded into the
    /// worst observed execution time. Before activation nothing is recorded
    /// and `Ok` is returned.
    pub fn check_deadline(&self, now: Timestamp, stats: &mut TaskStats) -> DeadlineStatus {
        let (release, deadline) = match (self.current_release(), self.absolute_deadline()) {
            (Some(release), Some(deadline)) => (release, deadline),
            _ => return DeadlineStatus::Ok,
        };

        let status = if now.is_after(deadline) {
            DeadlineStatus::Missed
        } else {
            DeadlineStatus::Ok
        };

        stats.record(now.diff(release), status);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockTime;
    use core::time::Duration;
    use proptest::prelude::*;

    #[test]
    fn activate_sets_both_absolute_times() {
        let mut timer = PeriodicTimer::new(20, 15);
        assert_eq!(timer.state(), ActivationState::Unstarted);
        assert_eq!(timer.next_activation(), None);

        timer.activate(Timestamp::from_millis(100));
        assert!(timer.is_active());
        assert_eq!(timer.next_activation(), Some(Timestamp::from_millis(120)));
        assert_eq!(timer.absolute_deadline(), Some(Timestamp::from_millis(115)));
        assert_eq!(timer.current_release(), Some(Timestamp::from_millis(100)));
    }

    #[test]
    fn advance_moves_by_fixed_increments() {
        let mut timer = PeriodicTimer::new(20, 20);
        timer.activate(Timestamp::from_millis(0));

        assert_eq!(timer.advance(), Some(Timestamp::from_millis(20)));
        assert_eq!(timer.next_activation(), Some(Timestamp::from_millis(40)));
        assert_eq!(timer.absolute_deadline(), Some(Timestamp::from_millis(40)));
    }

    #[test]
    fn advance_before_activation_is_noop() {
        let mut timer = PeriodicTimer::new(20, 20);
        assert_eq!(timer.advance(), None);
        assert_eq!(timer.state(), ActivationState::Unstarted);
    }

    #[test]
    fn wait_on_unstarted_timer_activates_now() {
        let clock = MockTime::with_initial(Timestamp::from_millis(7));
        let mut timer = PeriodicTimer::new(10, 10);

        let released = timer.wait(&clock);
        assert_eq!(released, Timestamp::from_millis(7));
        assert_eq!(timer.next_activation(), Some(Timestamp::from_millis(17)));
        assert_eq!(clock.now(), Timestamp::from_millis(7));
    }

    #[test]
    fn deadline_check_on_time() {
        let clock = MockTime::new();
        let mut timer = PeriodicTimer::new(20, 20);
        let mut stats = TaskStats::default();

        timer.activate(clock.now());
        clock.advance_ms(2);

        assert_eq!(timer.check_deadline(clock.now(), &mut stats), DeadlineStatus::Ok);
        assert_eq!(stats.deadline_misses, 0);
        assert_eq!(stats.woet_us, 2_000);
    }

    #[test]
    fn deadline_exactly_at_boundary_is_not_missed() {
        let mut timer = PeriodicTimer::new(20, 20);
        let mut stats = TaskStats::default();
        timer.activate(Timestamp::ZERO);

        let at_deadline = Timestamp::from_millis(20);
        assert_eq!(timer.check_deadline(at_deadline, &mut stats), DeadlineStatus::Ok);

        let past_deadline = Timestamp::from_nanos(20_000_001);
        assert_eq!(
            timer.check_deadline(past_deadline, &mut stats),
            DeadlineStatus::Missed
        );
        assert_eq!(stats.deadline_misses, 1);
    }

    #[test]
    fn overrun_counts_one_miss_per_check() {
        let clock = MockTime::new();
        let mut timer = PeriodicTimer::new(20, 20);
        let mut stats = TaskStats::default();

        timer.activate(clock.now());
        for _ in 0..5 {
            clock.advance_ms(25);
            assert!(timer.check_deadline(clock.now(), &mut stats).is_missed());
            timer.wait(&clock);
        }

        assert_eq!(stats.deadline_misses, 5);
        assert_eq!(stats.iterations, 5);
    }

    #[test]
    fn check_before_activation_records_nothing() {
        let timer = PeriodicTimer::new(20, 20);
        let mut stats = TaskStats::default();
        assert_eq!(
            timer.check_deadline(Timestamp::from_millis(1_000), &mut stats),
            DeadlineStatus::Ok
        );
        assert_eq!(stats, TaskStats::default());
    }

    #[test]
    fn late_iteration_does_not_shift_the_sequence() {
        let clock = MockTime::new();
        let mut timer = PeriodicTimer::new(20, 20);
        timer.activate(clock.now());

        // One iteration overruns past two activation points
        clock.advance_ms(45);
        assert_eq!(timer.wait(&clock), Timestamp::from_millis(20));
        // No sleep happened: the target was already in the past
        assert_eq!(clock.now(), Timestamp::from_millis(45));

        // The next target is still on the original grid
        assert_eq!(timer.wait(&clock), Timestamp::from_millis(40));
        assert_eq!(timer.wait(&clock), Timestamp::from_millis(60));
        assert_eq!(clock.now(), Timestamp::from_millis(60));
    }

    proptest! {
        #[test]
        fn sleep_targets_form_arithmetic_sequence(
            period in 1u32..200,
            start_ms in 0u64..1_000_000,
            work in proptest::collection::vec(0u64..500, 1..64),
        ) {
            let clock = MockTime::with_initial(Timestamp::from_millis(start_ms));
            let mut timer = PeriodicTimer::new(period, period);
            timer.activate(clock.now());

            let mut previous: Option<Timestamp> = None;
            for w in work {
                clock.advance(Duration::from_millis(w));
                let target = timer.wait(&clock);
                if let Some(prev) = previous {
                    prop_assert_eq!(target.diff(prev), Duration::from_millis(period as u64));
                }
                previous = Some(target);
            }
        }

        #[test]
        fn woet_never_decreases(
            work in proptest::collection::vec(0u64..100, 1..64),
        ) {
            let clock = MockTime::new();
            let mut timer = PeriodicTimer::new(20, 20);
            let mut stats = TaskStats::default();
            timer.activate(clock.now());

            let mut last_woet = 0;
            for w in work {
                clock.advance_ms(w);
                timer.check_deadline(clock.now(), &mut stats);
                prop_assert!(stats.woet_us >= last_woet);
                last_woet = stats.woet_us;
                timer.wait(&clock);
            }
        }
    }
}
