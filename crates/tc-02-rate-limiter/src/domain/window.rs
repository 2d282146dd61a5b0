//! Fixed-window counter.
//!
//! A client may send up to `max_per_window` requests per window. The window
//! starts at the first request after the previous one lapsed, so a client can
//! land up to twice the limit across a window boundary.

use serde::Serialize;
use shared_types::Timestamp;

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub allowed: bool,
    /// Milliseconds until the current window lapses; set only when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl Admission {
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            retry_after_ms: None,
        }
    }

    pub const fn deny(retry_after_ms: u64) -> Self {
        Self {
            allowed: false,
            retry_after_ms: Some(retry_after_ms),
        }
    }
}

/// Per-client window state. Process-local and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub window_start: Timestamp,
    pub count: u32,
}

impl RateWindow {
    /// A fresh window holding the request that opened it.
    pub fn open(now: Timestamp) -> Self {
        Self {
            window_start: now,
            count: 1,
        }
    }

    fn elapsed(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.window_start)
    }

    /// The window has run its full length. The boundary is inclusive: a client
    /// that waits exactly `window_ms` after the window opened starts a new one.
    pub fn is_lapsed(&self, now: Timestamp, window_ms: u64) -> bool {
        self.elapsed(now) >= window_ms
    }

    /// Count one request at `now` and decide whether it is admitted.
    pub fn record(&mut self, now: Timestamp, window_ms: u64, max_per_window: u32) -> Admission {
        if self.is_lapsed(now, window_ms) {
            *self = Self::open(now);
            return Admission::allow();
        }

        self.count = self.count.saturating_add(1);
        if self.count <= max_per_window {
            Admission::allow()
        } else {
            Admission::deny(window_ms - self.elapsed(now))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 60_000;

    #[test]
    fn test_admits_up_to_limit() {
        let mut window = RateWindow::open(0);
        assert!(window.record(10, WINDOW, 3).allowed);
        assert!(window.record(20, WINDOW, 3).allowed);
        let denied = window.record(30, WINDOW, 3);
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after_ms, Some(WINDOW - 30));
    }

    #[test]
    fn test_full_window_length_resets() {
        let mut window = RateWindow::open(1_000);
        window.record(1_001, WINDOW, 1);
        assert!(!window.is_lapsed(1_000 + WINDOW - 1, WINDOW));
        assert!(window.is_lapsed(1_000 + WINDOW, WINDOW));
        let admitted = window.record(1_000 + WINDOW, WINDOW, 1);
        assert!(admitted.allowed);
        assert_eq!(window.count, 1);
        assert_eq!(window.window_start, 1_000 + WINDOW);
    }

    #[test]
    fn test_clock_going_backwards_counts_as_same_window() {
        let mut window = RateWindow::open(5_000);
        let denied = window.record(4_000, WINDOW, 1);
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after_ms, Some(WINDOW));
    }

    #[test]
    fn test_admission_serialization() {
        let json = serde_json::to_value(Admission::deny(1500)).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["retryAfterMs"], 1500);
        let json = serde_json::to_value(Admission::allow()).unwrap();
        assert!(json.get("retryAfterMs").is_none());
    }
}
