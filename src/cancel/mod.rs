//! Cancellation for running scripts
//!
//! A `CancelToken` is shared between the thread running a script and whoever
//! may want to stop it. Animation pauses sleep on the token's condition
//! variable, so a cancel request wakes them at once instead of waiting out
//! the delay.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Shared {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// Shared, clonable cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    shared: Arc<Shared>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every sleeper
    pub fn cancel(&self) {
        let mut cancelled = self.shared.cancelled.lock();
        *cancelled = true;
        self.shared.wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shared.cancelled.lock()
    }

    /// Clear a previous request so the token can serve another run
    pub fn reset(&self) {
        *self.shared.cancelled.lock() = false;
    }

    /// Pause for `duration` unless cancelled first.
    ///
    /// Returns `false` if the pause ended because of cancellation.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut cancelled = self.shared.cancelled.lock();
        while !*cancelled {
            if self
                .shared
                .wakeup
                .wait_until(&mut cancelled, deadline)
                .timed_out()
            {
                break;
            }
        }
        !*cancelled
    }
}
