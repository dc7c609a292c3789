//! Synchronized state abstraction for values shared between task threads.
//!
//! This module provides the `SharedState` trait, the closure-based access
//! pattern every shared value in the crate goes through, and `Guarded<T>`,
//! its `std::sync::Mutex` implementation. A guarded value cannot be read or
//! written without holding its own lock, and each value has a lock of its
//! own so that readers of one tunable never contend with writers of another.

use std::sync::{Mutex, MutexGuard};

/// Closure-based access to synchronized state.
///
/// # Example
///
/// ```
/// use sound_trail::core::traits::sync::{Guarded, SharedState};
///
/// struct Counter {
///     value: u32,
/// }
///
/// fn increment<S: SharedState<Counter>>(state: &S) -> u32 {
///     state.with_mut(|counter| {
///         counter.value += 1;
///         counter.value
///     })
/// }
///
/// let state = Guarded::new(Counter { value: 0 });
/// assert_eq!(increment(&state), 1);
/// ```
pub trait SharedState<T> {
    /// Access state immutably while holding the lock.
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Access state mutably while holding the lock.
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

/// A value that is only reachable while its own mutex is held.
///
/// Every `get`, `set` and `update` takes the lock for the whole operation,
/// so a reader always sees a value written in full by exactly one call.
/// A poisoned lock is recovered: the protected data is plain values, and a
/// panicking task must not wedge the others.
#[derive(Debug, Default)]
pub struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    /// Creates a new `Guarded` holding `value`.
    ///
    /// This is a const fn, allowing static initialization.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.lock() = value;
    }

    /// Replace the value with `f(current)` in one critical section and
    /// return a copy of the new value.
    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(T) -> T,
        T: Clone,
    {
        let mut guard = self.lock();
        let next = f(guard.clone());
        *guard = next.clone();
        next
    }

    /// Replace the value and return the previous one.
    pub fn replace(&self, value: T) -> T {
        core::mem::replace(&mut *self.lock(), value)
    }

    /// Consume the wrapper and return the value.
    pub fn into_inner(self) -> T {
        self.inner
            .into_inner()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl<T: Clone> Guarded<T> {
    /// Copy of the current value.
    pub fn get(&self) -> T {
        self.lock().clone()
    }
}

impl<T> SharedState<T> for Guarded<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.lock())
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_set_then_get() {
        let gain = Guarded::new(50u32);
        gain.set(73);
        assert_eq!(gain.get(), 73);
    }

    #[test]
    fn test_update_returns_new_value() {
        let gain = Guarded::new(99u32);
        let next = gain.update(|v| (v + 1).min(100));
        assert_eq!(next, 100);
        assert_eq!(gain.update(|v| (v + 1).min(100)), 100);
    }

    #[test]
    fn test_replace_returns_previous() {
        let done = Guarded::new(false);
        assert!(!done.replace(true));
        assert!(done.get());
    }

    #[test]
    fn test_with_and_with_mut() {
        let state = Guarded::new(vec![1, 2, 3]);
        state.with_mut(|v| v.push(4));
        assert_eq!(state.with(|v| v.len()), 4);
        assert_eq!(state.into_inner(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let counter = Arc::new(Guarded::new(0u64));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..100 {
                        counter.update(|v| v + 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.get(), 1000);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let state = Arc::new(Guarded::new(5u32));

        let poisoner = Arc::clone(&state);
        let result = thread::spawn(move || {
            poisoner.with_mut(|v| {
                *v = 6;
                panic!("task body panicked while holding the lock");
            })
        })
        .join();
        assert!(result.is_err());

        assert_eq!(state.get(), 6);
        state.set(7);
        assert_eq!(state.get(), 7);
    }
}
