//! Indicator periods and WSS weights.

use serde::{Deserialize, Serialize};
use whalewave_core::error::{WhaleError, WhaleResult};

/// Periods and parameters for every indicator the scorer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub stoch_k_period: usize,
    pub stoch_smooth_period: usize,
    pub stoch_d_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub cci_period: usize,
    pub mfi_period: usize,
    pub adx_period: usize,
    pub choppiness_period: usize,
    pub regression_period: usize,
    pub atr_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub kc_period: usize,
    pub kc_multiplier: f64,
    pub supertrend_period: usize,
    pub supertrend_factor: f64,
    pub chandelier_period: usize,
    pub chandelier_multiplier: f64,
    pub psar_start: f64,
    pub psar_step: f64,
    pub psar_max: f64,
    pub vwap_period: usize,
    pub hv_period: usize,
    /// Bars per year on the primary timeframe
    pub periods_per_year: f64,
    pub ichimoku_tenkan: usize,
    pub ichimoku_kijun: usize,
    pub ichimoku_senkou_b: usize,
    pub divergence_lookback: usize,
    pub fisher_period: usize,
    pub laguerre_gamma: f64,
    pub volume_period: usize,
    /// ATR bars averaged for the volatility ratio
    pub volatility_window: usize,
    /// EMA period on the trend timeframe for the HTF bias
    pub trend_ema_period: usize,
    /// Dominance ratio for an order book wall
    pub wall_ratio: f64,
    pub wall_levels: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            stoch_k_period: 14,
            stoch_smooth_period: 3,
            stoch_d_period: 3,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            cci_period: 20,
            mfi_period: 14,
            adx_period: 14,
            choppiness_period: 14,
            regression_period: 20,
            atr_period: 14,
            bb_period: 20,
            bb_std_dev: 2.0,
            kc_period: 20,
            kc_multiplier: 1.5,
            supertrend_period: 10,
            supertrend_factor: 3.0,
            chandelier_period: 22,
            chandelier_multiplier: 3.0,
            psar_start: 0.02,
            psar_step: 0.02,
            psar_max: 0.2,
            vwap_period: 20,
            hv_period: 20,
            periods_per_year: 35_040.0, // 15m bars
            ichimoku_tenkan: 9,
            ichimoku_kijun: 26,
            ichimoku_senkou_b: 52,
            divergence_lookback: 20,
            fisher_period: 10,
            laguerre_gamma: 0.5,
            volume_period: 20,
            volatility_window: 50,
            trend_ema_period: 50,
            wall_ratio: 3.0,
            wall_levels: 5,
        }
    }
}

impl IndicatorSettings {
    /// Reject zero periods and out-of-range parameters.
    pub fn validate(&self) -> WhaleResult<()> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("stoch_k_period", self.stoch_k_period),
            ("stoch_smooth_period", self.stoch_smooth_period),
            ("stoch_d_period", self.stoch_d_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("cci_period", self.cci_period),
            ("mfi_period", self.mfi_period),
            ("adx_period", self.adx_period),
            ("atr_period", self.atr_period),
            ("bb_period", self.bb_period),
            ("kc_period", self.kc_period),
            ("supertrend_period", self.supertrend_period),
            ("chandelier_period", self.chandelier_period),
            ("vwap_period", self.vwap_period),
            ("ichimoku_tenkan", self.ichimoku_tenkan),
            ("ichimoku_kijun", self.ichimoku_kijun),
            ("ichimoku_senkou_b", self.ichimoku_senkou_b),
            ("fisher_period", self.fisher_period),
            ("volume_period", self.volume_period),
            ("volatility_window", self.volatility_window),
            ("trend_ema_period", self.trend_ema_period),
            ("wall_levels", self.wall_levels),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(WhaleError::Config(format!("{} must be greater than 0", name)));
        }

        for (name, p) in [
            ("choppiness_period", self.choppiness_period),
            ("regression_period", self.regression_period),
            ("hv_period", self.hv_period),
        ] {
            if p < 2 {
                return Err(WhaleError::Config(format!("{} must be at least 2", name)));
            }
        }
        if self.divergence_lookback < 4 {
            return Err(WhaleError::Config(
                "divergence_lookback must be at least 4".into(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(WhaleError::Config(
                "macd_fast must be less than macd_slow".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.laguerre_gamma) {
            return Err(WhaleError::Config(
                "laguerre_gamma must be within [0, 1]".into(),
            ));
        }
        for (name, value) in [
            ("bb_std_dev", self.bb_std_dev),
            ("kc_multiplier", self.kc_multiplier),
            ("supertrend_factor", self.supertrend_factor),
            ("chandelier_multiplier", self.chandelier_multiplier),
            ("psar_start", self.psar_start),
            ("psar_step", self.psar_step),
            ("psar_max", self.psar_max),
            ("periods_per_year", self.periods_per_year),
            ("wall_ratio", self.wall_ratio),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(WhaleError::Config(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    /// Bars the primary series needs before every indicator is warm.
    pub fn warmup_bars(&self) -> usize {
        [
            self.rsi_period + 1,
            self.macd_slow + self.macd_signal,
            2 * self.adx_period,
            self.bb_period.max(self.kc_period),
            self.chandelier_period,
            self.regression_period,
            self.atr_period + self.volatility_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Component weights and thresholds of the weighted scoring system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WssWeights {
    /// Higher-timeframe bias vote
    pub trend_mtf: f64,
    pub supertrend: f64,
    pub chandelier: f64,
    /// Multiplier on the whole momentum component
    pub momentum: f64,
    /// MACD histogram sign vote inside momentum
    pub macd_vote: f64,
    pub squeeze: f64,
    pub divergence: f64,
    /// FVG and order book wall proximity
    pub liquidity: f64,
    pub scalp_combined: f64,
    pub scalp_individual: f64,
    /// Fractional dampening / boost applied in extreme volatility
    pub volatility: f64,
    pub action_threshold: f64,
    pub scalping_threshold: f64,
    /// Laguerre RSI distance from 0 / 100 that counts as oversold / overbought
    pub laguerre_extreme: f64,
    /// Volume spike multiple of its average
    pub volume_multiple: f64,
}

impl Default for WssWeights {
    fn default() -> Self {
        Self {
            trend_mtf: 2.0,
            supertrend: 1.0,
            chandelier: 1.0,
            momentum: 1.0,
            macd_vote: 0.5,
            squeeze: 1.0,
            divergence: 2.5,
            liquidity: 1.5,
            scalp_combined: 3.0,
            scalp_individual: 0.5,
            volatility: 0.3,
            action_threshold: 2.0,
            scalping_threshold: 1.5,
            laguerre_extreme: 20.0,
            volume_multiple: 1.5,
        }
    }
}

impl WssWeights {
    pub fn validate(&self) -> WhaleResult<()> {
        let weights = [
            ("trend_mtf", self.trend_mtf),
            ("supertrend", self.supertrend),
            ("chandelier", self.chandelier),
            ("momentum", self.momentum),
            ("macd_vote", self.macd_vote),
            ("squeeze", self.squeeze),
            ("divergence", self.divergence),
            ("liquidity", self.liquidity),
            ("scalp_combined", self.scalp_combined),
            ("scalp_individual", self.scalp_individual),
            ("action_threshold", self.action_threshold),
            ("scalping_threshold", self.scalping_threshold),
            ("volume_multiple", self.volume_multiple),
        ];
        if let Some((name, _)) = weights
            .iter()
            .find(|(_, w)| !(w.is_finite() && *w >= 0.0))
        {
            return Err(WhaleError::Config(format!(
                "weight {} must be a non-negative number",
                name
            )));
        }
        if !(0.0..1.0).contains(&self.volatility) {
            return Err(WhaleError::Config(
                "volatility weight must be within [0, 1)".into(),
            ));
        }
        if !(0.0..=50.0).contains(&self.laguerre_extreme) {
            return Err(WhaleError::Config(
                "laguerre_extreme must be within [0, 50]".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(IndicatorSettings::default().validate().is_ok());
        assert!(WssWeights::default().validate().is_ok());
    }

    #[test]
    fn test_zero_period_rejected() {
        let settings = IndicatorSettings {
            atr_period: 0,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("atr_period"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = WssWeights {
            divergence: -1.0,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_warmup_covers_volatility_window() {
        assert_eq!(IndicatorSettings::default().warmup_bars(), 64);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let weights: WssWeights = serde_json::from_str(r#"{"divergence": 3.0}"#).unwrap();
        assert_eq!(weights.divergence, 3.0);
        assert_eq!(weights.action_threshold, 2.0);
    }
}
