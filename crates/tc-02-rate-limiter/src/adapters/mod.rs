pub mod store_window;

pub use store_window::StoreWindowLimiter;
