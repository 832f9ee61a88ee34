use std::sync::{Mutex, MutexGuard};

/// Take a mutex even when a panicking handler poisoned it. Console, registry and
/// reader state are all plain data, so the inner value is still usable.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        crate::log_debug(&format!("{context}: mutex poisoned, recovering"));
        poisoned.into_inner()
    })
}
