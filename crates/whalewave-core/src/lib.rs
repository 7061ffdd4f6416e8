//! Core types and traits for the WhaleWave engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle, OrderBook, MarketSnapshot)
//! - The untrusted strategy decision shape and the oracle context
//! - Decimal money helpers shared by the risk ledger
//! - Collaborator traits for data providers, strategy oracles and indicators

pub mod error;
pub mod money;
pub mod traits;
pub mod types;

pub use error::{DataError, OracleError, SnapshotError, WhaleError, WhaleResult};
pub use traits::*;
pub use types::*;
