//! Core traits for the engine.

mod data_provider;
mod indicator;
mod oracle;

pub use data_provider::DataProvider;
pub use indicator::{CandleIndicator, Indicator};
pub use oracle::StrategyOracle;
