//! # TC-02 Rate Limiter
//!
//! Per-client fixed-window admission control, independent of every other
//! subsystem.
//!
//! `admit(client_key)` returns `{allowed, retryAfterMs?}`. A window opens on
//! a client's first request and admits `max_per_window` requests until it has
//! run `window` long; the next request after that opens a new window.
//!
//! ## Known tradeoffs
//!
//! - Up to `2 × max_per_window` requests can pass across a window boundary.
//! - `FixedWindowLimiter` is process-local. `StoreWindowLimiter` shares counts
//!   through the store at the cost of one round trip per request, and admits
//!   when the store is down.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::StoreWindowLimiter;
pub use domain::{Admission, RateLimiterConfig, RateWindow};
pub use ports::AdmissionControl;
pub use service::FixedWindowLimiter;
