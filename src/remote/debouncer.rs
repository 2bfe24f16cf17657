//! Leading+trailing debounce for the remote tag search.
//!
//! The first call after an idle gap fires immediately; rapid repeats within
//! the window coalesce into one trailing fire carrying the latest query.
//! Implemented as an explicit state machine over caller-supplied instants,
//! so tests control the clock and no timer thread is needed.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No recent activity; the next submit fires on the leading edge.
    Idle,
    /// A fire happened recently; nothing is queued.
    Cooldown,
    /// A fire happened recently and a trailing query is queued.
    Pending,
}

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    phase: Phase,
    deadline: Instant,
    pending_query: Option<String>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            phase: Phase::Idle,
            deadline: Instant::now(),
            pending_query: None,
        }
    }

    /// Record a call at `now`. Returns the query to dispatch immediately
    /// (leading edge), or `None` when the call was coalesced into the
    /// trailing slot.
    pub fn submit(&mut self, query: &str, now: Instant) -> Option<String> {
        if self.phase != Phase::Idle && now >= self.deadline {
            // Window expired without a poll; any still-queued query is
            // superseded by this newer one
            if self.pending_query.take().is_some() {
                log::debug!("dropping superseded trailing query");
            }
            self.phase = Phase::Idle;
        }

        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Cooldown;
                self.deadline = now + self.window;
                Some(query.to_string())
            }
            Phase::Cooldown | Phase::Pending => {
                self.phase = Phase::Pending;
                self.pending_query = Some(query.to_string());
                self.deadline = now + self.window;
                None
            }
        }
    }

    /// Poll for a trailing-edge fire. Returns the coalesced query once the
    /// window has elapsed since the last submit.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if now < self.deadline {
            return None;
        }
        match self.phase {
            Phase::Pending => {
                self.phase = Phase::Idle;
                self.pending_query.take()
            }
            Phase::Cooldown => {
                self.phase = Phase::Idle;
                None
            }
            Phase::Idle => None,
        }
    }

    /// Earliest instant at which [`poll`](Self::poll) can fire or settle.
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Idle => None,
            Phase::Cooldown | Phase::Pending => Some(self.deadline),
        }
    }
}

#[cfg(test)]
#[path = "debouncer_tests.rs"]
mod debouncer_tests;
