//! Weighted Scoring System (WSS).
//!
//! Builds an [`IndicatorContext`] from a market snapshot and reduces it to a
//! single directional score with an adaptive action threshold.

mod context;
mod settings;
mod wss;

pub use context::IndicatorContext;
pub use settings::{IndicatorSettings, WssWeights};
pub use wss::{compute_wss, WssComponents, WssResult};
