//! Global sliding-window rate limiter.
//!
//! Admits at most `max_calls` requests within any trailing window of
//! `window` length. One counter is shared by every caller of the process.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected { retry_after_secs: u64 },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    /// Admitted timestamps, oldest at the front
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            admitted: Mutex::new(VecDeque::new()),
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Admit or reject a request arriving now.
    pub fn try_admit(&self) -> Admission {
        self.try_admit_at(Instant::now())
    }

    /// Evict, decide and record in one critical section.
    pub fn try_admit_at(&self, now: Instant) -> Admission {
        let mut admitted = self.admitted.lock();

        // Keep the sequence non-decreasing when callers race with older instants.
        let now = match admitted.back() {
            Some(&last) if last > now => last,
            _ => now,
        };

        evict_expired(&mut admitted, now, self.window);

        if admitted.len() < self.max_calls {
            admitted.push_back(now);
            return Admission::Admitted;
        }

        let retry_after_secs = admitted
            .front()
            .map(|&oldest| (oldest + self.window).saturating_duration_since(now).as_secs())
            .unwrap_or(0);

        Admission::Rejected { retry_after_secs }
    }

    /// Number of admitted requests still inside the window.
    pub fn in_window(&self) -> usize {
        self.in_window_at(Instant::now())
    }

    pub fn in_window_at(&self, now: Instant) -> usize {
        let mut admitted = self.admitted.lock();
        evict_expired(&mut admitted, now, self.window);
        admitted.len()
    }
}

fn evict_expired(admitted: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = admitted.front() {
        if now.saturating_duration_since(oldest) >= window {
            admitted.pop_front();
        } else {
            break;
        }
    }
}
