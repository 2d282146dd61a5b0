//! # Subsystem Container
//!
//! Configuration loading and dependency injection for the engine.

pub mod config;
pub mod subsystems;

pub use config::{Environment, NodeConfig};
pub use subsystems::SubsystemContainer;
