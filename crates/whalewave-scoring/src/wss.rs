//! Weighted Scoring System.
//!
//! Four independent components are summed into one directional conviction
//! score, then damped or boosted by the current volatility regime:
//!
//! 1. Trend: HTF bias, SuperTrend and Chandelier votes scaled by regression R²
//! 2. Momentum: RSI and %K distance from 50 plus the MACD histogram sign
//! 3. Structure: squeeze, divergence, FVG and order book wall proximity
//! 4. Scalping: Laguerre RSI, Fisher cross and volume spike on the fast series

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::IndicatorContext;
use crate::settings::WssWeights;

/// Per-component breakdown of a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WssComponents {
    pub trend: f64,
    pub momentum: f64,
    pub structure: f64,
    pub scalping: f64,
    pub volatility_ratio: f64,
    /// Sum of the components before the volatility adjustment
    pub raw_score: f64,
}

/// Composite score and the threshold a trade must clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WssResult {
    pub score: f64,
    pub action_threshold: f64,
    pub components: WssComponents,
}

impl WssResult {
    /// Score clears the threshold in the long direction.
    pub fn is_bullish(&self) -> bool {
        self.score >= self.action_threshold
    }

    /// Score clears the threshold in the short direction.
    pub fn is_bearish(&self) -> bool {
        self.score <= -self.action_threshold
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Score the context at `current_price`.
pub fn compute_wss(context: &IndicatorContext, current_price: f64, w: &WssWeights) -> WssResult {
    let trend = trend_component(context, w);
    let momentum = momentum_component(context, w);
    let structure = structure_component(context, current_price, w);
    let scalping = scalping_component(context, w);
    let raw_score = trend + momentum + structure + scalping;

    let ratio = context.volatility_ratio;
    let score = if ratio > 1.5 {
        raw_score * (1.0 - w.volatility)
    } else if ratio < 0.5 {
        raw_score * (1.0 + w.volatility)
    } else {
        raw_score
    };

    let action_threshold = if scalping.abs() > w.scalping_threshold / 2.0 {
        w.scalping_threshold
    } else {
        w.action_threshold
    };

    debug!(
        trend,
        momentum,
        structure,
        scalping,
        volatility_ratio = ratio,
        score,
        action_threshold,
        "WSS computed"
    );

    WssResult {
        score,
        action_threshold,
        components: WssComponents {
            trend,
            momentum,
            structure,
            scalping,
            volatility_ratio: ratio,
            raw_score,
        },
    }
}

fn trend_component(ctx: &IndicatorContext, w: &WssWeights) -> f64 {
    let ind = &ctx.indicators;
    let votes = f64::from(ind.htf_bias) * w.trend_mtf
        + f64::from(ind.supertrend) * w.supertrend
        + f64::from(ind.chandelier) * w.chandelier;
    votes * ind.regression_r2
}

fn momentum_component(ctx: &IndicatorContext, w: &WssWeights) -> f64 {
    let ind = &ctx.indicators;
    let rsi_vote = (50.0 - ind.rsi) / 50.0;
    let stoch_vote = (50.0 - ind.stoch_k) / 50.0;
    let macd_vote = sign(ind.macd_histogram) * w.macd_vote;
    (rsi_vote + stoch_vote + macd_vote) * w.momentum
}

fn structure_component(ctx: &IndicatorContext, price: f64, w: &WssWeights) -> f64 {
    let ind = &ctx.indicators;
    let mut score = 0.0;

    if ind.squeeze {
        score += w.squeeze * f64::from(ind.htf_bias);
    }
    score += f64::from(ind.divergence) * w.divergence;

    if let Some(gap) = ctx.active_fvg.filter(|g| g.contains(price)) {
        score += f64::from(gap.kind.sign()) * w.liquidity;
    }

    if ind.atr > 0.0 {
        if let Some(support) = ctx.walls.nearest_support() {
            if price - support <= ind.atr {
                score += w.liquidity;
            }
        }
        if let Some(resistance) = ctx.walls.nearest_resistance() {
            if resistance - price <= ind.atr {
                score -= w.liquidity;
            }
        }
    }

    score
}

fn scalping_component(ctx: &IndicatorContext, w: &WssWeights) -> f64 {
    let s = &ctx.scalping;

    let laguerre: i8 = if s.laguerre_rsi < w.laguerre_extreme {
        1
    } else if s.laguerre_rsi > 100.0 - w.laguerre_extreme {
        -1
    } else {
        0
    };

    let crossed_up = s.fisher_prev <= s.fisher_trigger_prev && s.fisher > s.fisher_trigger;
    let crossed_down = s.fisher_prev >= s.fisher_trigger_prev && s.fisher < s.fisher_trigger;
    let fisher: i8 = if s.fisher.abs() >= 0.5 {
        0
    } else if crossed_up {
        1
    } else if crossed_down {
        -1
    } else {
        0
    };

    let volume: i8 = if s.volume_average > 0.0 && s.volume > s.volume_average * w.volume_multiple
    {
        s.bar_direction
    } else {
        0
    };

    if laguerre != 0 && laguerre == fisher && fisher == volume {
        f64::from(laguerre) * w.scalp_combined
    } else if laguerre != 0 && laguerre == fisher {
        f64::from(laguerre) * w.scalp_combined / 2.0
    } else {
        f64::from(laguerre + fisher + volume) * w.scalp_individual
    }
}
