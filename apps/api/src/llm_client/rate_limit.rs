//! Fixed-interval rate limiter shared by every clone of the LLM client.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Spaces calls at least `interval` apart. Callers queue on the lock in
/// arrival order; nothing is dropped or retried.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    /// `0` disables limiting.
    pub fn per_minute(max_requests: u32) -> Self {
        let interval = if max_requests == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(60) / max_requests
        };
        Self {
            interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next slot is free and reserves it.
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        if *next_slot > now {
            sleep_until(*next_slot).await;
        }
        *next_slot = (*next_slot).max(now) + self.interval;
    }
}
