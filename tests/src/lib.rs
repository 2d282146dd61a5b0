//! # TerraClaim Test Suite
//!
//! Cross-subsystem flows run against a fully wired node with an in-process
//! store, a scripted geocoder and a manual clock.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # TestNode: container + router + test doubles
//! └── integration/      # End-to-end flows through the HTTP surface
//!     ├── claim_flows.rs
//!     ├── classification.rs
//!     ├── rate_limiting.rs
//!     └── timeline_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p tc-tests
//!
//! # By category
//! cargo test -p tc-tests integration::rate_limiting
//!
//! # Benchmarks
//! cargo bench -p tc-tests
//! ```

#![allow(clippy::unwrap_used)]

pub mod harness;
pub mod integration;
