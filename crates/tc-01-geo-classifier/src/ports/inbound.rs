//! # Inbound Ports (Driving Ports)

use async_trait::async_trait;
use shared_types::{Classification, Coordinate};

/// Maps a coordinate to a territory classification.
///
/// Never fails: when every source is unavailable the answer is
/// `TerritoryType::Unknown` and the caller applies its own policy.
#[async_trait]
pub trait TerritoryClassifier: Send + Sync {
    async fn classify(&self, coord: Coordinate) -> Classification;
}
