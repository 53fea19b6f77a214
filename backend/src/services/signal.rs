//! Manual-reset event used to wake the refresh worker and to signal cycle
//! completion back to a waiting caller.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A boolean flag with a condition variable.
///
/// `set` wakes every waiter and the flag stays set until `reset` (or a
/// `wait_and_reset` that observed it).
#[derive(Debug, Default)]
pub struct Event {
    flag: Mutex<bool>,
    cvar: Condvar,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        let mut flag = self.flag.lock();
        *flag = true;
        self.cvar.notify_all();
    }

    pub fn reset(&self) {
        *self.flag.lock() = false;
    }

    pub fn is_set(&self) -> bool {
        *self.flag.lock()
    }

    /// Wait until the event is set or `timeout` elapses.
    ///
    /// Returns `true` if the event was set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut flag = self.flag.lock();
        self.wait_locked(&mut flag, timeout)
    }

    /// Like [`wait_timeout`](Self::wait_timeout), but clears the flag before
    /// releasing the lock. A `set` that lands between the wake-up and the
    /// reset is therefore never lost: it is either consumed here or still
    /// pending for the next wait.
    pub fn wait_and_reset(&self, timeout: Duration) -> bool {
        let mut flag = self.flag.lock();
        let was_set = self.wait_locked(&mut flag, timeout);
        *flag = false;
        was_set
    }

    fn wait_locked(&self, flag: &mut parking_lot::MutexGuard<'_, bool>, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        // Loop to absorb spurious wake-ups.
        while !**flag {
            if self.cvar.wait_until(flag, deadline).timed_out() {
                return **flag;
            }
        }
        true
    }
}
