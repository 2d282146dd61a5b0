//! # Shared Store
//!
//! The shared key-value store every TerraClaim instance reads and writes.
//!
//! ## Guarantees
//!
//! - A grouped write (`Pipeline`) is one round trip that succeeds or fails as
//!   a whole at the network level.
//! - There is no isolation between two grouped writes that touch the same
//!   keys. Check-then-write sequences can race.
//! - Through `BoundedStore`, no call waits longer than the configured
//!   operation timeout per attempt.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod bounded;
pub mod command;
pub mod config;
pub mod errors;
pub mod keys;
pub mod memory;
pub mod ports;
pub mod testing;

pub use bounded::BoundedStore;
pub use command::{CommandReply, Pipeline, StoreCommand};
pub use config::StoreConfig;
pub use errors::StoreError;
pub use memory::InMemoryStore;
pub use ports::SharedStore;
