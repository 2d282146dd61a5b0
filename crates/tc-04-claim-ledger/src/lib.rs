//! # TC-04 Claim Ledger
//!
//! Records cell claims and pixel paints in the shared store.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): outcomes, policy config, errors
//! - **Ports Layer** (`ports/`): `ClaimLedgerApi`, the gateway's write API
//! - **Service Layer** (`service.rs`): `ClaimLedger`
//!
//! ## Invariants
//!
//! - A cell is in the claimed set iff it is in exactly one country set and
//!   one actor set.
//! - Water and international waters are never written.
//! - Every successful write appends to the matching timeline and prunes it.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    BatchClaimResult, ClaimOutcome, ClaimResult, LedgerConfig, LedgerError, PaintResult,
};
pub use ports::ClaimLedgerApi;
pub use service::ClaimLedger;
