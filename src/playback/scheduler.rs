//! Timer abstraction driving auto-play
//!
//! `VirtualTimer` keeps its own clock so playback is deterministic: callers
//! feed it elapsed time and ask whether a tick is due.

use std::time::Duration;

/// Recurring timer contract used by [`super::Player`]
pub trait Scheduler {
    /// Arm the timer; the first tick is due one interval from now
    fn start(&mut self, interval: Duration);

    /// Disarm the timer
    fn stop(&mut self);

    /// Change the interval; the deadline already scheduled is kept
    fn set_interval(&mut self, interval: Duration);

    /// Current interval
    fn interval(&self) -> Duration;

    /// Whether the timer is armed
    fn is_running(&self) -> bool;

    /// Move the clock forward
    fn advance(&mut self, elapsed: Duration);

    /// Consume one due tick, rescheduling the next deadline
    fn take_due(&mut self) -> bool;
}

/// Deterministic timer over a virtual clock
#[derive(Debug, Clone, Default)]
pub struct VirtualTimer {
    now: Duration,
    interval: Duration,
    next_due: Option<Duration>,
}

impl VirtualTimer {
    /// Stopped timer with the given interval
    pub fn new(interval: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            interval,
            next_due: None,
        }
    }

    /// Virtual time elapsed so far
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Deadline of the next tick, if armed
    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }
}

impl Scheduler for VirtualTimer {
    fn start(&mut self, interval: Duration) {
        self.interval = interval;
        self.next_due = Some(self.now + interval);
    }

    fn stop(&mut self) {
        self.next_due = None;
    }

    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;
    }

    fn take_due(&mut self) -> bool {
        match self.next_due {
            Some(due) if due <= self.now => {
                self.next_due = Some(due + self.interval);
                true
            }
            _ => false,
        }
    }
}
