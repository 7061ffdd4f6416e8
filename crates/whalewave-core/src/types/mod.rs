//! Core data types for the engine.

mod candle;
mod context;
mod decision;
mod order_book;
mod side;
mod snapshot;
mod timeframe;

pub use candle::{as_of_index, Candle, CandleColumns};
pub use context::{IndicatorSnapshot, OracleContext, ScalpingSnapshot, VolatilityRegime};
pub use decision::{Action, StrategyDecision, ValidatedDecision};
pub use order_book::{OrderBook, OrderBookLevel};
pub use side::Side;
pub use snapshot::{DailyLevels, MarketSnapshot};
pub use timeframe::Timeframe;
