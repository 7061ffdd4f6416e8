//! Strategy oracle trait.

use async_trait::async_trait;

use crate::error::OracleError;
use crate::types::{OracleContext, StrategyDecision};

/// External decision maker consulted once per cycle.
///
/// Whatever it returns is untrusted and must pass the strategy gate before
/// it can move money.
#[async_trait]
pub trait StrategyOracle: Send + Sync {
    /// Propose a decision for the given context.
    async fn decide(&self, context: &OracleContext) -> Result<StrategyDecision, OracleError>;

    /// Get the oracle name.
    fn name(&self) -> &str;
}
