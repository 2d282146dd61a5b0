pub mod config;
pub mod window;

pub use config::RateLimiterConfig;
pub use window::{Admission, RateWindow};
