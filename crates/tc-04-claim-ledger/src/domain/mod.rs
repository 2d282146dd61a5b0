pub mod config;
pub mod errors;
pub mod outcomes;

pub use config::LedgerConfig;
pub use errors::LedgerError;
pub use outcomes::{BatchClaimResult, ClaimOutcome, ClaimResult, PaintResult};
