//! Sliding window rate limiter for market data providers.
//!
//! Keeps the timestamps of recent calls and suspends callers until the
//! oldest one leaves the window, so that no more than `max_calls` calls
//! complete within any trailing window.

use std::collections::VecDeque;
use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Window length used by [`RateLimiter::per_minute`].
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Sliding window rate limiter.
///
/// The timestamp log sits behind an async mutex that stays locked while a
/// caller sleeps. Waiting callers therefore queue in FIFO order and the log
/// only ever has one writer.
pub struct RateLimiter {
    /// Timestamps of calls still inside the window, oldest first.
    calls: Mutex<VecDeque<Instant>>,
    max_calls: usize,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `max_calls` per `window`.
    ///
    /// A limit of zero would block forever and is treated as one.
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            calls: Mutex::new(VecDeque::with_capacity(max_calls.max(1))),
            max_calls: max_calls.max(1),
            window,
        }
    }

    /// Create a limiter allowing `max_calls` per 60 seconds.
    pub fn per_minute(max_calls: u32) -> Self {
        Self::new(max_calls as usize, DEFAULT_WINDOW)
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait until one more call fits in the window, then record it.
    ///
    /// Returns immediately when the window has room; otherwise suspends for
    /// at least as long as it takes the oldest recorded call to expire.
    pub async fn wait_if_needed(&self) {
        let mut calls = self.calls.lock().await;

        Self::purge(&mut calls, Instant::now(), self.window);

        while calls.len() >= self.max_calls {
            let Some(oldest) = calls.front().copied() else {
                break;
            };
            let wake_at = oldest + self.window;
            debug!(
                "Rate limiter: {} calls in window, waiting {:?}",
                calls.len(),
                wake_at.saturating_duration_since(Instant::now())
            );
            tokio::time::sleep_until(wake_at).await;
            Self::purge(&mut calls, Instant::now(), self.window);
        }

        calls.push_back(Instant::now());
    }

    /// Number of recorded calls still inside the window.
    pub async fn calls_in_window(&self) -> usize {
        let mut calls = self.calls.lock().await;
        Self::purge(&mut calls, Instant::now(), self.window);
        calls.len()
    }

    /// Drop timestamps whose age has reached the window length.
    fn purge(calls: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = calls.front() {
            if now.saturating_duration_since(*oldest) >= window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}
