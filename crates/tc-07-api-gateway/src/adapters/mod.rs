pub mod http;

pub use http::{client_key, router, serve, AppState, UNKNOWN_CLIENT};
