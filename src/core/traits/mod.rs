//! Core traits for platform-agnostic task plumbing.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                Scheduler / pipeline tasks                 │
//! │                            │                              │
//! │                            ▼                              │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │  TimeSource (sound_trail_core)  │  SharedState<T>   │  │
//! │  │  + now()                        │  + with(f)        │  │
//! │  │  + sleep_until(t)               │  + with_mut(f)    │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! │               │                              │            │
//! │       ┌───────┴────────┐                     ▼            │
//! │       ▼                ▼                 Guarded<T>       │
//! │  MonotonicClock     MockTime            (std Mutex)       │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sound_trail::core::traits::{Guarded, MockTime, SharedState, TimeSource};
//!
//! fn stamp<T: TimeSource, S: SharedState<u64>>(time: &T, state: &S) {
//!     let now = time.now_ms();
//!     state.with_mut(|v| *v = now);
//! }
//!
//! let time = MockTime::new();
//! time.advance_ms(40);
//! let elapsed = Guarded::new(0u64);
//! stamp(&time, &elapsed);
//! assert_eq!(elapsed.get(), 40);
//! ```

pub mod sync;
pub mod time;

pub use sync::{Guarded, SharedState};
pub use time::{MockTime, MonotonicClock, TimeSource};
