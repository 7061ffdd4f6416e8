//! Risk management for WhaleWave.
//!
//! Provides fixed-fractional position sizing, circuit breakers and the
//! decimal-accounted single-position [`RiskEngine`].

mod account;
mod circuit_breaker;
mod config;
mod position_sizer;
mod risk_engine;

pub use account::{AccountState, ExitReason, Position, TradeEvent, TradeEventKind};
pub use circuit_breaker::BreakerStatus;
pub use config::RiskConfig;
pub use position_sizer::{size_position, Sizing, SizingError};
pub use risk_engine::{OpenError, RiskAction, RiskEngine};
