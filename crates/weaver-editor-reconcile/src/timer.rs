//! Cancellable single-shot timers.
//!
//! The controller never sleeps. It asks a `Timer` to schedule a wakeup and
//! the host calls back with the handle when it fires.

use web_time::Duration;

/// Handle for a scheduled wakeup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// A cancellable, single-shot timer.
pub trait Timer {
    /// Schedule a wakeup after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Cancel a pending wakeup. Cancelling a fired or unknown handle is a
    /// no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Virtual-clock timer. Time only moves when `advance` is called.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Duration,
    next_handle: u64,
    pending: Vec<(TimerHandle, Duration)>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed so far.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|(h, _)| *h == handle)
    }

    /// Move the clock forward, returning the handles that fired in deadline
    /// order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerHandle> {
        self.now += by;
        let now = self.now;
        let mut fired: Vec<(TimerHandle, Duration)> = Vec::new();
        self.pending.retain(|&(handle, deadline)| {
            if deadline <= now {
                fired.push((handle, deadline));
                false
            } else {
                true
            }
        });
        fired.sort_by_key(|&(handle, deadline)| (deadline, handle.0));
        fired.into_iter().map(|(handle, _)| handle).collect()
    }
}

impl Timer for ManualTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push((handle, self.now + delay));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(h, _)| *h != handle);
    }
}
