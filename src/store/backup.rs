//! Debounced backup scheduling
//!
//! A poll-driven deadline: every qualifying mutation re-arms it, and the
//! pending snapshot action fires once the quiet period elapses without
//! another mutation. The host event loop drives it via `poll`.

use std::time::{Duration, Instant};

/// Cancellable, re-armable deadline for the post-settle backup snapshot.
#[derive(Debug, Clone)]
pub struct BackupScheduler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl BackupScheduler {
    /// Create a disarmed scheduler with the given quiet-period delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm the scheduler, replacing any pending deadline.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a snapshot action is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending action fires; `None` when disarmed.
    pub fn due_in(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Consume the deadline if it has elapsed. Returns `true` at most once
    /// per armed period.
    pub fn poll(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
