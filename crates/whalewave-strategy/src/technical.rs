//! Deterministic rule-based oracle.
//!
//! Trades in the direction of the WSS once it clears the threshold, with
//! ATR-scaled stop and target. Lets the pipeline run end to end without an
//! external decision maker.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use whalewave_core::error::{OracleError, WhaleError, WhaleResult};
use whalewave_core::traits::StrategyOracle;
use whalewave_core::types::{Action, OracleContext, StrategyDecision};

/// Parameters for [`TechnicalOracle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalOracleSettings {
    pub sl_atr_multiple: f64,
    pub tp_atr_multiple: f64,
    /// Confidence reported when the score sits exactly on the threshold
    pub base_confidence: f64,
}

impl Default for TechnicalOracleSettings {
    fn default() -> Self {
        Self {
            sl_atr_multiple: 1.5,
            tp_atr_multiple: 2.0,
            base_confidence: 0.65,
        }
    }
}

impl TechnicalOracleSettings {
    pub fn validate(&self) -> WhaleResult<()> {
        if !(self.sl_atr_multiple > 0.0 && self.tp_atr_multiple > 0.0) {
            return Err(WhaleError::Config("ATR multiples must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.base_confidence) {
            return Err(WhaleError::Config(
                "base_confidence must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Strategy oracle driven purely by the indicator context.
#[derive(Debug, Clone, Default)]
pub struct TechnicalOracle {
    settings: TechnicalOracleSettings,
}

impl TechnicalOracle {
    pub const LABEL: &'static str = "WSS_TECHNICAL";

    pub fn new(settings: TechnicalOracleSettings) -> Self {
        Self { settings }
    }

    /// Synchronous decision used by the async trait method.
    pub fn evaluate(&self, ctx: &OracleContext) -> StrategyDecision {
        let atr = ctx.indicators.atr;
        if !(atr > 0.0 && ctx.price > 0.0) {
            return StrategyDecision::hold("ATR not available");
        }

        let action = if ctx.wss_score >= ctx.action_threshold {
            Action::Buy
        } else if ctx.wss_score <= -ctx.action_threshold {
            Action::Sell
        } else {
            return StrategyDecision::hold(format!(
                "WSS {:.2} inside threshold {:.2}",
                ctx.wss_score, ctx.action_threshold
            ));
        };

        let strength = if ctx.action_threshold > 0.0 {
            ctx.wss_score.abs() / ctx.action_threshold
        } else {
            1.0
        };
        let confidence = (strength * self.settings.base_confidence).min(1.0);

        let direction = if action == Action::Buy { 1.0 } else { -1.0 };
        let entry = ctx.price;
        let stop_loss = entry - direction * self.settings.sl_atr_multiple * atr;
        let take_profit = entry + direction * self.settings.tp_atr_multiple * atr;

        StrategyDecision::trade(
            action,
            Self::LABEL,
            confidence,
            entry,
            stop_loss,
            take_profit,
            format!(
                "WSS {:.2} beyond threshold {:.2}, {} volatility",
                ctx.wss_score, ctx.action_threshold, ctx.volatility_regime
            ),
        )
    }
}

#[async_trait]
impl StrategyOracle for TechnicalOracle {
    async fn decide(&self, context: &OracleContext) -> Result<StrategyDecision, OracleError> {
        Ok(self.evaluate(context))
    }

    fn name(&self) -> &str {
        "technical"
    }
}
