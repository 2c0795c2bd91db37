//! Interruptible lock acquisition.

use crate::error::{StoreError, StoreResult};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How long a waiter sleeps on the lock before re-checking its interrupt.
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A cancellation flag a blocked caller can be woken with.
///
/// Clones share the same flag, so one thread can hold the handle used
/// for waiting while another raises it.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    /// Creates a lowered interrupt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the interrupt; pending and future waits give up.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Lowers the interrupt again.
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }

    /// Returns true if the interrupt is raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

/// Takes `mutex`, giving up with [`StoreError::Interrupted`] once
/// `interrupt` is raised while waiting.
///
/// An uncontended lock is taken even if the interrupt is already raised.
pub(crate) fn lock_interruptible<'a, T>(
    mutex: &'a Mutex<T>,
    interrupt: &Interrupt,
) -> StoreResult<MutexGuard<'a, T>> {
    if let Some(guard) = mutex.try_lock() {
        return Ok(guard);
    }
    loop {
        if interrupt.is_raised() {
            debug!("lock wait interrupted");
            return Err(StoreError::Interrupted);
        }
        if let Some(guard) = mutex.try_lock_for(LOCK_POLL_INTERVAL) {
            return Ok(guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn interrupt_clones_share_flag() {
        let interrupt = Interrupt::new();
        let other = interrupt.clone();
        assert!(!other.is_raised());
        interrupt.raise();
        assert!(other.is_raised());
        other.clear();
        assert!(!interrupt.is_raised());
    }

    #[test]
    fn uncontended_lock_ignores_interrupt() {
        let mutex = Mutex::new(1);
        let interrupt = Interrupt::new();
        interrupt.raise();
        let guard = lock_interruptible(&mutex, &interrupt).unwrap();
        assert_eq!(*guard, 1);
    }

    #[test]
    fn contended_lock_gives_up_when_raised() {
        let mutex = Arc::new(Mutex::new(0));
        let interrupt = Interrupt::new();
        let held = mutex.lock();

        let waiter = {
            let mutex = Arc::clone(&mutex);
            let interrupt = interrupt.clone();
            thread::spawn(move || lock_interruptible(&mutex, &interrupt).map(|_| ()))
        };
        thread::sleep(Duration::from_millis(20));
        interrupt.raise();

        let result = waiter.join().unwrap();
        assert!(matches!(result, Err(StoreError::Interrupted)));
        drop(held);
    }

    #[test]
    fn contended_lock_acquired_after_release() {
        let mutex = Arc::new(Mutex::new(0));
        let held = mutex.lock();

        let waiter = {
            let mutex = Arc::clone(&mutex);
            thread::spawn(move || {
                let mut guard = lock_interruptible(&mutex, &Interrupt::new()).unwrap();
                *guard += 1;
            })
        };
        thread::sleep(Duration::from_millis(20));
        drop(held);
        waiter.join().unwrap();
        assert_eq!(*mutex.lock(), 1);
    }
}
