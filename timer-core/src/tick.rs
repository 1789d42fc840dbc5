//! The periodic recompute schedule.
//!
//! A `Ticker` is owned by one timer and does nothing on its own: the host
//! loop asks `Timer::poll` whether a tick is due, so every recompute runs on
//! the same thread as the operations that mutate the timer.

use crate::error::TimerError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Ticker {
    interval_ms: u64,
    next_due_ms: Option<u64>,
}

impl Ticker {
    pub fn new(interval_ms: u64) -> Result<Self, TimerError> {
        if interval_ms == 0 {
            return Err(TimerError::InvalidInterval(interval_ms));
        }
        Ok(Self {
            interval_ms,
            next_due_ms: None,
        })
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Schedule the next tick one interval after `now`. Restarting a running
    /// ticker just moves its deadline.
    pub fn start(&mut self, now: u64) {
        self.next_due_ms = Some(now.saturating_add(self.interval_ms));
    }

    /// Safe to call any number of times.
    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn is_due(&self, now: u64) -> bool {
        matches!(self.next_due_ms, Some(due) if now >= due)
    }

    /// Consume a due tick and schedule the following one. Missed intervals
    /// are not replayed.
    pub fn fire(&mut self, now: u64) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.start(now);
        true
    }

    /// Time left until the next tick, `None` when cancelled.
    pub fn remaining_ms(&self, now: u64) -> Option<u64> {
        self.next_due_ms.map(|due| due.saturating_sub(now))
    }
}
