//! Strategy layer.
//!
//! - [`StrategyGate`] validates untrusted oracle decisions against the WSS
//! - [`TechnicalOracle`] is a deterministic rule-based oracle

mod gate;
mod technical;

pub use gate::{GateOutcome, GateSettings, RejectReason, StrategyGate};
pub use technical::{TechnicalOracle, TechnicalOracleSettings};
