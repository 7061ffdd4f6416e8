//! Strategy decisions proposed by an external oracle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Side;

/// Allowed decision actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// Side to open for this action, `None` for HOLD.
    pub fn side(&self) -> Option<Side> {
        match self {
            Action::Buy => Some(Side::Buy),
            Action::Sell => Some(Side::Sell),
            Action::Hold => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            "HOLD" => Ok(Action::Hold),
            other => Err(format!("Unknown action: {}", other)),
        }
    }
}

/// Decision as received from a strategy oracle.
///
/// Untrusted: the action is kept as a raw string and every numeric field is
/// optional so a missing or malformed value survives deserialization and is
/// rejected later by the gate instead of failing the whole cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub action: String,
    #[serde(default, alias = "strategy_name", alias = "strategy")]
    pub strategy_label: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, alias = "entry")]
    pub entry_price: Option<f64>,
    #[serde(default, alias = "sl")]
    pub stop_loss: Option<f64>,
    #[serde(default, alias = "tp")]
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub reason: String,
}

impl StrategyDecision {
    /// A HOLD decision with the given reason.
    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Hold.to_string(),
            strategy_label: "NONE".to_string(),
            reason: reason.into(),
            ..Default::default()
        }
    }

    /// A BUY or SELL decision with every numeric field populated.
    pub fn trade(
        action: Action,
        strategy_label: impl Into<String>,
        confidence: f64,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            action: action.to_string(),
            strategy_label: strategy_label.into(),
            confidence: Some(confidence),
            entry_price: Some(entry_price),
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            reason: reason.into(),
        }
    }

    /// Parsed action, if it is one of the allowed values.
    pub fn parsed_action(&self) -> Result<Action, String> {
        self.action.parse()
    }

    /// Parse a decision from an oracle's JSON reply.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A BUY or SELL decision that passed the strategy gate.
///
/// Prices are already in the money domain; this is the only shape the risk
/// engine accepts for opening a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedDecision {
    pub side: Side,
    pub strategy_label: String,
    pub confidence: f64,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub reason: String,
}
