//! Data provider trait.

use async_trait::async_trait;

use crate::error::DataError;
use crate::types::MarketSnapshot;

/// Source of per-cycle market snapshots.
///
/// Network retries, backoff and timeouts belong to the implementation; the
/// engine only sees a snapshot or an error for the cycle.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetch the next snapshot for `symbol`.
    async fn fetch_snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}
