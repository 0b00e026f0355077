//! Synchronization utilities for robust mutex handling
//!
//! Broker state, observer lists and consumer buffers all sit behind mutexes.
//! A poisoned lock means a panic happened while state was half-updated; these
//! helpers turn that into an ordinary [`Error`] instead of a second panic.

use crate::error::Error;
use std::sync::{LockResult, Mutex, MutexGuard};

/// Handle poisoned mutex cases with consistent error handling
///
/// Converts a poison error into an application error built by
/// `error_constructor`. Also accepts the result of `Condvar::wait_timeout`,
/// which carries the guard inside a tuple.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use amqp_runner::core::sync::handle_mutex_poison;
/// use amqp_runner::Error;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), Error::channel).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). This indicates a panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Lock a mutex, reporting poison as a channel error
pub fn lock<T>(mutex: &Mutex<T>) -> crate::Result<MutexGuard<'_, T>> {
    handle_mutex_poison(mutex.lock(), Error::channel)
}
