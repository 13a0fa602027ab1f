//! Liveness token and the timers driven from the render loop.
//!
//! Nothing here spawns OS timers. Each timer is polled with the frame's
//! `now`, so cancelling one is just clearing its deadline.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use web_time::Instant;

/// Shared "still mounted" flag. Cloned into every load job and checked once
/// when the job's result is applied.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark cancelled. Returns `true` only for the call that flipped it.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// A token that is cancelled when either `self` or the child is.
    pub fn child(&self) -> ChildToken {
        ChildToken {
            parent: self.clone(),
            own: CancellationToken::new(),
        }
    }
}

/// Per-job token: cancelled by its own timeout or by the gallery teardown.
#[derive(Debug, Clone)]
pub struct ChildToken {
    parent: CancellationToken,
    own: CancellationToken,
}

impl ChildToken {
    pub fn cancel(&self) -> bool {
        self.own.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.own.is_cancelled() || self.parent.is_cancelled()
    }
}

/// Trailing-edge debounce: fires once `delay` after the last `poke`.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` once when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Repeating timer. Missed periods collapse into a single tick.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now >= next => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }
}

/// Passes at most one value per `period`; the latest value submitted during
/// the cool-down is delivered when it ends.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    period: Duration,
    last: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last: None,
            pending: None,
        }
    }

    pub fn submit(&mut self, value: T) {
        self.pending = Some(value);
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = self
            .last
            .is_none_or(|last| now.duration_since(last) >= self.period);
        if ready && self.pending.is_some() {
            self.last = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
