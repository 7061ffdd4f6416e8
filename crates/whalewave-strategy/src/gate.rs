//! Validation of untrusted strategy decisions against the WSS.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use whalewave_core::error::{WhaleError, WhaleResult};
use whalewave_core::money::price_to_decimal;
use whalewave_core::types::{Action, Side, StrategyDecision, ValidatedDecision};
use whalewave_scoring::WssResult;

/// Gate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Lowest confidence accepted for BUY/SELL
    pub min_confidence: f64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
        }
    }
}

impl GateSettings {
    pub fn validate(&self) -> WhaleResult<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(WhaleError::Config(
                "min_confidence must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Why a decision was demoted to HOLD.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("{0} is missing")]
    MissingField(&'static str),

    #[error("{0} is not a finite number")]
    NonFinite(&'static str),

    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("confidence {confidence:.2} below minimum {minimum:.2}")]
    LowConfidence { confidence: f64, minimum: f64 },

    #[error("{0} must be positive")]
    NonPositivePrice(&'static str),

    #[error("{side} levels out of order: stop {stop_loss}, entry {entry}, target {take_profit}")]
    LevelsOutOfOrder {
        side: Side,
        entry: f64,
        stop_loss: f64,
        take_profit: f64,
    },

    #[error("{side} against WSS {score:.2} (threshold {threshold:.2})")]
    ScoreMismatch {
        side: Side,
        score: f64,
        threshold: f64,
    },

    #[error("{0} has no decimal representation")]
    Unrepresentable(&'static str),
}

/// Result of passing a decision through the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Approved(ValidatedDecision),
    Hold,
    Rejected(RejectReason),
}

impl GateOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, GateOutcome::Approved(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, GateOutcome::Rejected(_))
    }

    /// The approved decision, if any.
    pub fn approved(&self) -> Option<&ValidatedDecision> {
        match self {
            GateOutcome::Approved(decision) => Some(decision),
            _ => None,
        }
    }

    /// Effective action after demotion.
    pub fn action(&self) -> Action {
        match self {
            GateOutcome::Approved(decision) => match decision.side {
                Side::Buy => Action::Buy,
                Side::Sell => Action::Sell,
            },
            GateOutcome::Hold | GateOutcome::Rejected(_) => Action::Hold,
        }
    }

    /// Short human-readable summary.
    pub fn describe(&self) -> String {
        match self {
            GateOutcome::Approved(d) => format!("{} approved ({})", d.side, d.strategy_label),
            GateOutcome::Hold => "HOLD".to_string(),
            GateOutcome::Rejected(reason) => format!("rejected: {}", reason),
        }
    }
}

/// Checks an oracle decision for structural validity and agreement with the
/// current WSS before it can reach the risk engine.
#[derive(Debug, Clone, Default)]
pub struct StrategyGate {
    settings: GateSettings,
}

struct Levels {
    confidence: f64,
    entry: f64,
    stop_loss: f64,
    take_profit: f64,
}

impl StrategyGate {
    pub fn new(settings: GateSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    /// Validate a decision; rejections are logged and demoted to HOLD.
    pub fn validate(&self, decision: &StrategyDecision, wss: &WssResult) -> GateOutcome {
        match self.check(decision, wss) {
            Ok(Some(validated)) => {
                debug!(
                    "Gate approved {} {} (confidence {:.2}, WSS {:.2})",
                    validated.side, validated.strategy_label, validated.confidence, wss.score
                );
                GateOutcome::Approved(validated)
            }
            Ok(None) => GateOutcome::Hold,
            Err(reason) => {
                warn!(
                    "Decision {:?} from {:?} demoted to HOLD: {}",
                    decision.action, decision.strategy_label, reason
                );
                GateOutcome::Rejected(reason)
            }
        }
    }

    fn check(
        &self,
        decision: &StrategyDecision,
        wss: &WssResult,
    ) -> Result<Option<ValidatedDecision>, RejectReason> {
        let action = decision
            .parsed_action()
            .map_err(|_| RejectReason::UnknownAction(decision.action.clone()))?;
        let Some(side) = action.side() else {
            return Ok(None);
        };

        let levels = Levels {
            confidence: required(decision.confidence, "confidence")?,
            entry: required(decision.entry_price, "entry_price")?,
            stop_loss: required(decision.stop_loss, "stop_loss")?,
            take_profit: required(decision.take_profit, "take_profit")?,
        };

        if !(0.0..=1.0).contains(&levels.confidence) {
            return Err(RejectReason::ConfidenceOutOfRange(levels.confidence));
        }
        if levels.confidence < self.settings.min_confidence {
            return Err(RejectReason::LowConfidence {
                confidence: levels.confidence,
                minimum: self.settings.min_confidence,
            });
        }

        for (name, price) in [
            ("entry_price", levels.entry),
            ("stop_loss", levels.stop_loss),
            ("take_profit", levels.take_profit),
        ] {
            if price <= 0.0 {
                return Err(RejectReason::NonPositivePrice(name));
            }
        }

        let ordered = match side {
            Side::Buy => levels.stop_loss < levels.entry && levels.entry < levels.take_profit,
            Side::Sell => levels.take_profit < levels.entry && levels.entry < levels.stop_loss,
        };
        if !ordered {
            return Err(RejectReason::LevelsOutOfOrder {
                side,
                entry: levels.entry,
                stop_loss: levels.stop_loss,
                take_profit: levels.take_profit,
            });
        }

        let agrees = match side {
            Side::Buy => wss.score >= wss.action_threshold,
            Side::Sell => wss.score <= -wss.action_threshold,
        };
        if !agrees {
            return Err(RejectReason::ScoreMismatch {
                side,
                score: wss.score,
                threshold: wss.action_threshold,
            });
        }

        Ok(Some(ValidatedDecision {
            side,
            strategy_label: decision.strategy_label.clone(),
            confidence: levels.confidence,
            entry_price: to_decimal(levels.entry, "entry_price")?,
            stop_loss: to_decimal(levels.stop_loss, "stop_loss")?,
            take_profit: to_decimal(levels.take_profit, "take_profit")?,
            reason: decision.reason.clone(),
        }))
    }
}

fn required(value: Option<f64>, name: &'static str) -> Result<f64, RejectReason> {
    match value {
        None => Err(RejectReason::MissingField(name)),
        Some(v) if !v.is_finite() => Err(RejectReason::NonFinite(name)),
        Some(v) => Ok(v),
    }
}

fn to_decimal(value: f64, name: &'static str) -> Result<Decimal, RejectReason> {
    price_to_decimal(value).ok_or(RejectReason::Unrepresentable(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn wss(score: f64) -> WssResult {
        WssResult {
            score,
            action_threshold: 2.0,
            ..Default::default()
        }
    }

    fn buy() -> StrategyDecision {
        StrategyDecision::trade(
            Action::Buy,
            "BREAKOUT",
            0.8,
            50000.0,
            49500.0,
            50750.0,
            "squeeze release",
        )
    }

    #[test]
    fn test_approves_aligned_buy() {
        let outcome = StrategyGate::default().validate(&buy(), &wss(2.5));
        let approved = outcome.approved().unwrap();

        assert_eq!(approved.side, Side::Buy);
        assert_eq!(approved.entry_price, dec!(50000));
        assert_eq!(approved.stop_loss, dec!(49500));
        assert_eq!(approved.take_profit, dec!(50750));
        assert_eq!(outcome.action(), Action::Buy);
    }

    #[test]
    fn test_buy_below_threshold_rejected_regardless_of_confidence() {
        let mut decision = buy();
        decision.confidence = Some(1.0);
        let outcome = StrategyGate::default().validate(&decision, &wss(1.99));

        assert!(matches!(
            outcome,
            GateOutcome::Rejected(RejectReason::ScoreMismatch { side: Side::Buy, .. })
        ));
        assert_eq!(outcome.action(), Action::Hold);
    }

    #[test]
    fn test_sell_needs_negative_score() {
        let decision = StrategyDecision::trade(
            Action::Sell,
            "FADE",
            0.9,
            100.0,
            102.0,
            96.0,
            "",
        );
        let gate = StrategyGate::default();

        assert!(gate.validate(&decision, &wss(-1.0)).is_rejected());
        assert!(gate.validate(&decision, &wss(-2.0)).is_approved());
    }

    #[test]
    fn test_hold_skips_numeric_checks() {
        let decision = StrategyDecision {
            action: " hold ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            StrategyGate::default().validate(&decision, &wss(0.0)),
            GateOutcome::Hold
        );
    }

    #[test]
    fn test_unknown_action() {
        let decision = StrategyDecision {
            action: "LONG".to_string(),
            ..buy()
        };
        assert_eq!(
            StrategyGate::default().validate(&decision, &wss(5.0)),
            GateOutcome::Rejected(RejectReason::UnknownAction("LONG".to_string()))
        );
    }

    #[test]
    fn test_missing_and_non_finite_fields() {
        let gate = StrategyGate::default();

        let mut missing = buy();
        missing.stop_loss = None;
        assert_eq!(
            gate.validate(&missing, &wss(5.0)),
            GateOutcome::Rejected(RejectReason::MissingField("stop_loss"))
        );

        let mut nan = buy();
        nan.take_profit = Some(f64::NAN);
        assert_eq!(
            gate.validate(&nan, &wss(5.0)),
            GateOutcome::Rejected(RejectReason::NonFinite("take_profit"))
        );
    }

    #[test]
    fn test_confidence_limits() {
        let gate = StrategyGate::default();

        let mut low = buy();
        low.confidence = Some(0.59);
        assert!(matches!(
            gate.validate(&low, &wss(5.0)),
            GateOutcome::Rejected(RejectReason::LowConfidence { .. })
        ));

        let mut high = buy();
        high.confidence = Some(1.2);
        assert_eq!(
            gate.validate(&high, &wss(5.0)),
            GateOutcome::Rejected(RejectReason::ConfidenceOutOfRange(1.2))
        );
    }

    #[test]
    fn test_levels_must_bracket_entry() {
        let mut decision = buy();
        decision.stop_loss = Some(50100.0);
        assert!(matches!(
            StrategyGate::default().validate(&decision, &wss(5.0)),
            GateOutcome::Rejected(RejectReason::LevelsOutOfOrder { .. })
        ));

        let mut negative = buy();
        negative.stop_loss = Some(-1.0);
        assert_eq!(
            StrategyGate::default().validate(&negative, &wss(5.0)),
            GateOutcome::Rejected(RejectReason::NonPositivePrice("stop_loss"))
        );
    }

    #[test]
    fn test_settings_validation() {
        assert!(GateSettings::default().validate().is_ok());
        assert!(GateSettings { min_confidence: 1.5 }.validate().is_err());
    }
}
