//! # TC-07 API Gateway
//!
//! HTTP surface of the engine.
//!
//! | Method | Path | |
//! |--------|------|-|
//! | POST | `/api/claim` | claim one cell |
//! | POST | `/api/claim/batch` | claim up to 50 cells |
//! | POST | `/api/paint/batch` | paint up to 50 pixels |
//! | GET | `/api/pixels/:position` | current pixel value |
//! | GET | `/api/leaderboard` | countries, actors, recent activity |
//! | GET | `/api/world` | claimed cells and totals |
//! | GET | `/api/actors/:id` | one actor's stats |
//! | GET | `/api/countries/:code` | one country's completion |
//! | GET | `/health`, `/metrics` | |
//!
//! Already-claimed and unclaimable cells answer 200 with `success: false`.
//! Errors use the codes in [`domain::codes`].

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod service;

pub use adapters::{client_key, router, serve, AppState};
pub use domain::{codes, ApiError, GatewayConfig, TrustedProxyConfig};
pub use service::ClaimService;

/// Startup and serving failures.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server bind error: {0}")]
    Bind(String),

    #[error("server error: {0}")]
    Serve(String),
}
