//! # Inbound Ports (Driving Ports)

use async_trait::async_trait;
use shared_types::{CellKey, PixelValue};
use tc_03_batch_validation::PixelEntry;

use crate::domain::{BatchClaimResult, ClaimResult, LedgerError, PaintResult};

/// Write-side API used by the gateway.
#[async_trait]
pub trait ClaimLedgerApi: Send + Sync {
    /// Claim one cell. Safe to retry after a store error.
    async fn claim_cell(&self, cell: &CellKey, actor_id: &str) -> Result<ClaimResult, LedgerError>;

    /// Claim many cells in one grouped write. Not safe to retry blindly: a
    /// failed write may have landed.
    async fn claim_batch(
        &self,
        cells: &[CellKey],
        actor_id: &str,
    ) -> Result<BatchClaimResult, LedgerError>;

    /// Overwrite pixel values; last write wins.
    async fn paint_batch(
        &self,
        pixels: &[PixelEntry],
        actor_id: &str,
    ) -> Result<PaintResult, LedgerError>;

    /// Current value of one pixel.
    async fn pixel(&self, position: &str) -> Result<Option<PixelValue>, LedgerError>;

    /// Distinct actors active in the online window across claims and paints.
    async fn online_actors(&self) -> Result<u64, LedgerError>;
}
