//! # Integration Flows
//!
//! Each module drives a wired node through the HTTP router and checks the
//! externally visible result plus the state left in the store.

pub mod claim_flows;
pub mod classification;
pub mod rate_limiting;
pub mod timeline_flows;
