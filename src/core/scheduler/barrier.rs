//! Single-producer / N-consumer precedence barrier
//!
//! # Purpose
//!
//! Forces strict round alternation between one producer task and a fixed
//! pool of consumer tasks:
//!
//! - every consumer's round-k work starts only after the producer has
//!   published round k
//! - the producer's round-(k+1) work starts only after every consumer has
//!   finished round k
//!
//! # Protocol
//!
//! ```text
//! producer: begin_round ─ produce ─ end_round(n) ──────────────── begin_round ...
//!                                        │ remaining = n             ▲
//!                                        ▼                           │ remaining == 0
//! consumer:              wait_turn(last) ─ consume ─ end_turn ───────┘
//! ```
//!
//! Rounds are numbered. A consumer passes the round number it last took to
//! [`PrecedenceBarrier::consumer_wait_turn`], so a fast consumer can never
//! take the same round twice while a slower partner still owes its turn.
//!
//! # Correctness Invariants
//!
//! - `0 <= remaining <= capacity` at all times
//! - `remaining == 0` exactly when the producer may begin a new round
//! - all waits are `while` loops, so spurious wakeups are harmless
//!
//! # Shutdown
//!
//! [`PrecedenceBarrier::close`] broadcasts both condition variables. A
//! producer blocked in `producer_begin_round` returns [`Turn::Closed`]; a
//! consumer returns `Closed` once no published round is left for it, so
//! rounds that were already published are still delivered.
//!
//! # Design Notes
//!
//! - Uses Mutex + Condvar (not atomics): one handoff per period is far from
//!   any contention limit, and the lock gives the happens-before edge that
//!   makes the published result visible to every consumer
//! - Poison-tolerant: a panicking task must not wedge its partners

use std::sync::{Condvar, Mutex, MutexGuard};

use super::error::BarrierError;

/// Result of a blocking barrier wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Proceed with the given round
    Ready(u64),
    /// The barrier was closed; stop
    Closed,
}

impl Turn {
    /// Round number when ready
    pub fn round(&self) -> Option<u64> {
        match self {
            Turn::Ready(round) => Some(*round),
            Turn::Closed => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Turn::Closed)
    }
}

/// Internal state protected by mutex.
#[derive(Debug, Default)]
struct State {
    /// Consumers still owing `consumer_end_turn` for the current round
    remaining: usize,
    /// Turns of the current round not yet taken by a consumer
    unclaimed: usize,
    /// Number of rounds published so far (the current round's number)
    round: u64,
    closed: bool,
}

/// Precedence barrier between one producer and up to `capacity` consumers.
///
/// # Thread Safety
///
/// Safe to share across threads via `Arc<PrecedenceBarrier>`: one producer
/// thread, any number of consumer threads up to `capacity`.
#[derive(Debug)]
pub struct PrecedenceBarrier {
    capacity: usize,
    state: Mutex<State>,
    producer_may_proceed: Condvar,
    consumers_may_proceed: Condvar,
}

impl PrecedenceBarrier {
    /// Barrier for up to `capacity` consumers, starting with no round
    /// outstanding.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(State::default()),
            producer_may_proceed: Condvar::new(),
            consumers_may_proceed: Condvar::new(),
        }
    }

    fn lock_or_recover(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Block until every consumer has finished the previous round.
    ///
    /// Returns the number the next round will carry, or `Closed`.
    pub fn producer_begin_round(&self) -> Turn {
        let mut st = self.lock_or_recover();
        while st.remaining != 0 && !st.closed {
            st = self
                .producer_may_proceed
                .wait(st)
                .unwrap_or_else(|poison| poison.into_inner());
        }
        if st.closed {
            Turn::Closed
        } else {
            Turn::Ready(st.round + 1)
        }
    }

    /// Publish a round owed to `n` consumers and wake them.
    ///
    /// Must follow a `producer_begin_round` that returned `Ready`. Returns the
    /// new round number.
    pub fn producer_end_round(&self, n: usize) -> Result<u64, BarrierError> {
        if n > self.capacity {
            return Err(BarrierError::TooManyConsumers {
                requested: n,
                capacity: self.capacity,
            });
        }

        let mut st = self.lock_or_recover();
        debug_assert_eq!(st.remaining, 0, "round published before the last one drained");
        st.round += 1;
        st.remaining = n;
        st.unclaimed = n;
        let round = st.round;
        drop(st);

        self.consumers_may_proceed.notify_all();
        Ok(round)
    }

    /// Block until a round newer than `last_seen` has a turn available.
    ///
    /// Pass 0 before the first round. On `Ready(round)` the caller owns one
    /// turn of that round and must call [`consumer_end_turn`] when done.
    ///
    /// [`consumer_end_turn`]: PrecedenceBarrier::consumer_end_turn
    pub fn consumer_wait_turn(&self, last_seen: u64) -> Turn {
        let mut st = self.lock_or_recover();
        loop {
            if st.round > last_seen && st.unclaimed > 0 {
                st.unclaimed -= 1;
                return Turn::Ready(st.round);
            }
            if st.closed {
                return Turn::Closed;
            }
            st = self
                .consumers_may_proceed
                .wait(st)
                .unwrap_or_else(|poison| poison.into_inner());
        }
    }

    /// Finish one consumer turn; the last one releases the producer.
    pub fn consumer_end_turn(&self) {
        let mut st = self.lock_or_recover();
        debug_assert!(st.remaining > 0, "turn ended without an outstanding round");
        st.remaining = st.remaining.saturating_sub(1);
        let drained = st.remaining == 0;
        drop(st);

        if drained {
            self.producer_may_proceed.notify_one();
        }
    }

    /// Close the barrier and wake every blocked task.
    pub fn close(&self) {
        let mut st = self.lock_or_recover();
        st.closed = true;
        drop(st);

        self.producer_may_proceed.notify_all();
        self.consumers_may_proceed.notify_all();
    }

    /// Consumers still owing a turn in the current round
    pub fn remaining(&self) -> usize {
        self.lock_or_recover().remaining
    }

    /// Rounds published since creation
    pub fn rounds_published(&self) -> u64 {
        self.lock_or_recover().round
    }

    /// Maximum number of consumers per round
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.lock_or_recover().closed
    }
}
