//! # Inbound Ports (Driving Ports)

use async_trait::async_trait;

use crate::domain::Admission;

/// Decides whether a client may proceed.
///
/// Implementations: `FixedWindowLimiter` (process-local) and
/// `StoreWindowLimiter` (shared across instances).
#[async_trait]
pub trait AdmissionControl: Send + Sync {
    async fn admit(&self, client_key: &str) -> Admission;
}
