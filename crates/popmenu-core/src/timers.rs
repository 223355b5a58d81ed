//! Cancellable one-shot timers on a host-driven clock.
//!
//! The session never sleeps. The host advances the clock from its event loop
//! and the queue hands back whatever came due, in deadline order.

use std::time::Duration;

/// Handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<A> {
    id: TimerId,
    deadline: Duration,
    action: A,
}

/// One-shot timers carrying an action of type `A`.
#[derive(Debug, Clone)]
pub struct TimerQueue<A> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            pending: Vec::new(),
        }
    }
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `action` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            deadline: self.now + delay,
            action,
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Earliest pending deadline, for hosts that arm a single OS timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// The clock moves to that timer's deadline, so anything its action
    /// schedules is relative to when it fired.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, A)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= until)
            .min_by_key(|(_, p)| (p.deadline, p.id))
            .map(|(i, _)| i)?;

        let fired = self.pending.remove(index);
        self.now = self.now.max(fired.deadline);
        Some((fired.id, fired.action))
    }

    /// Move the clock forward. Never moves it backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
