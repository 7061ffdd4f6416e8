//! Latest indicator readings across the three timeframes.

use serde::{Deserialize, Serialize};
use tracing::trace;
use whalewave_core::types::{
    Candle, CandleColumns, IndicatorSnapshot, MarketSnapshot, OracleContext, ScalpingSnapshot,
    VolatilityRegime,
};
use whalewave_indicators::smoothing::{ema, sma, sma_from};
use whalewave_indicators::{
    detect_walls, Adx, Atr, BollingerBands, CandleIndicator, Cci, ChandelierExit, Choppiness,
    Divergence, FairValueGap, FairValueGaps, FisherTransform, HistoricalVolatility, Ichimoku,
    Indicator, KeltnerChannel, LaguerreRsi, LinearRegression, Macd, Mfi, Obv, ParabolicSar,
    PivotLevels, Rsi, Squeeze, Stochastic, SuperTrend, Vwap, WallLevels,
};

use crate::settings::IndicatorSettings;
use crate::wss::WssResult;

/// Everything the scorer needs from one snapshot.
///
/// Each timeframe is cut at its own as-of index before any indicator runs, so
/// "latest" always means the last bar at or before the snapshot time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorContext {
    pub symbol: String,
    pub timestamp: i64,
    /// Close of the latest primary bar
    pub close: f64,
    pub indicators: IndicatorSnapshot,
    pub scalping: ScalpingSnapshot,
    /// Current ATR over its rolling average; 1 while the average is unavailable
    pub volatility_ratio: f64,
    pub active_fvg: Option<FairValueGap>,
    pub walls: WallLevels,
    pub pivots: Option<PivotLevels>,
}

fn last<T: Copy + Default>(series: &[T]) -> T {
    series.last().copied().unwrap_or_default()
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

impl IndicatorContext {
    /// Compute every indicator on the snapshot.
    ///
    /// Expects a snapshot that already passed [`MarketSnapshot::validate`];
    /// empty series produce neutral readings rather than errors.
    pub fn build(snapshot: &MarketSnapshot, settings: &IndicatorSettings) -> Self {
        let primary = snapshot.primary_as_of();
        let trend = snapshot.trend_as_of();
        let scalping = snapshot.scalping_as_of();

        let (indicators, atr_series) = primary_readings(primary, trend, settings);
        let volatility_ratio = volatility_ratio(&atr_series, settings);

        let walls = detect_walls(
            &snapshot.order_book,
            snapshot.last_price,
            settings.wall_ratio,
            settings.wall_levels,
        );
        let pivots = snapshot.prior_day.is_available().then(|| {
            let day = snapshot.prior_day;
            PivotLevels::fibonacci(day.high, day.low, day.close)
        });

        let context = Self {
            symbol: snapshot.symbol.clone(),
            timestamp: snapshot.timestamp,
            close: primary.last().map_or(0.0, |c| c.close),
            indicators,
            scalping: scalping_readings(scalping, settings),
            volatility_ratio,
            active_fvg: FairValueGaps::new().active(primary),
            walls,
            pivots,
        };

        trace!(
            symbol = %context.symbol,
            primary_bars = primary.len(),
            trend_bars = trend.len(),
            scalping_bars = scalping.len(),
            volatility_ratio = context.volatility_ratio,
            "Indicator context built"
        );

        context
    }

    pub fn volatility_regime(&self) -> VolatilityRegime {
        VolatilityRegime::from_ratio(self.volatility_ratio)
    }

    /// Read-only view handed to the strategy oracle.
    pub fn oracle_context(&self, wss: &WssResult, price: f64) -> OracleContext {
        OracleContext {
            symbol: self.symbol.clone(),
            timestamp: self.timestamp,
            price,
            wss_score: wss.score,
            action_threshold: wss.action_threshold,
            volatility_ratio: self.volatility_ratio,
            volatility_regime: self.volatility_regime(),
            indicators: self.indicators.clone(),
            scalping: self.scalping.clone(),
            pivots: self.pivots.map(|p| p.to_map()).unwrap_or_default(),
            support_walls: self.walls.support_prices(),
            resistance_walls: self.walls.resistance_prices(),
            active_fvg: self.active_fvg.map(|g| (g.bottom, g.top)),
        }
    }
}

fn primary_readings(
    primary: &[Candle],
    trend: &[Candle],
    s: &IndicatorSettings,
) -> (IndicatorSnapshot, Vec<f64>) {
    let closes = primary.closes();

    let rsi = Rsi::new(s.rsi_period).calculate(&closes);
    let stoch = Stochastic::with_periods(s.stoch_k_period, s.stoch_smooth_period, s.stoch_d_period)
        .compute(primary);
    let macd = Macd::with_periods(s.macd_fast, s.macd_slow, s.macd_signal).calculate(&closes);
    let adx = Adx::new(s.adx_period).compute(primary);
    let regression = LinearRegression::new(s.regression_period).calculate(&closes);
    let atr = Atr::new(s.atr_period).compute(primary);

    let bollinger = BollingerBands::with_params(s.bb_period, s.bb_std_dev).calculate(&closes);
    let keltner = KeltnerChannel::with_params(s.kc_period, s.kc_multiplier).compute(primary);
    let squeeze = Squeeze::from_bands(
        &bollinger,
        &keltner,
        s.bb_period.max(s.kc_period).saturating_sub(1),
    );

    let supertrend = SuperTrend::with_params(s.supertrend_period, s.supertrend_factor)
        .compute(primary);
    let chandelier = ChandelierExit::with_params(s.chandelier_period, s.chandelier_multiplier)
        .compute(primary);
    let psar = ParabolicSar::with_params(s.psar_start, s.psar_step, s.psar_max).compute(primary);
    let ichimoku =
        Ichimoku::with_periods(s.ichimoku_tenkan, s.ichimoku_kijun, s.ichimoku_senkou_b)
            .compute(primary);
    let divergence = Divergence::from_rsi(primary, &rsi, s.divergence_lookback);

    let (stoch, macd, adx, regression) = (last(&stoch), last(&macd), last(&adx), last(&regression));
    let (bollinger, keltner, ichimoku) = (last(&bollinger), last(&keltner), last(&ichimoku));
    let (supertrend, chandelier) = (supertrend.last(), chandelier.last());

    let snapshot = IndicatorSnapshot {
        rsi: last(&rsi),
        stoch_k: stoch.k,
        stoch_d: stoch.d,
        macd: macd.macd,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        cci: last(&Cci::new(s.cci_period).compute(primary)),
        mfi: last(&Mfi::new(s.mfi_period).compute(primary)),
        adx: adx.adx,
        plus_di: adx.plus_di,
        minus_di: adx.minus_di,
        choppiness: last(&Choppiness::new(s.choppiness_period).compute(primary)),
        regression_slope: regression.slope,
        regression_r2: regression.r2,
        atr: last(&atr),
        bb_upper: bollinger.upper,
        bb_lower: bollinger.lower,
        kc_upper: keltner.upper,
        kc_lower: keltner.lower,
        squeeze: squeeze.last().copied().unwrap_or(false),
        supertrend: supertrend.map_or(1, |o| o.trend),
        supertrend_stop: supertrend.map_or(0.0, |o| o.stop),
        chandelier: chandelier.map_or(1, |o| o.trend),
        chandelier_stop: chandelier.map_or(0.0, |o| o.stop),
        psar: psar.last().map_or(0.0, |o| o.stop),
        obv: last(&Obv::new().compute(primary)),
        vwap: last(&Vwap::new(s.vwap_period).compute(primary)),
        historical_volatility: last(
            &HistoricalVolatility::new(s.hv_period, s.periods_per_year).calculate(&closes),
        ),
        tenkan: ichimoku.tenkan,
        kijun: ichimoku.kijun,
        senkou_a: ichimoku.senkou_a,
        senkou_b: ichimoku.senkou_b,
        divergence: last(&divergence),
        htf_bias: htf_bias(trend, s.trend_ema_period),
    };

    (snapshot, atr)
}

/// Sign of the trend close against its EMA; 0 until the EMA has a full period.
fn htf_bias(trend: &[Candle], period: usize) -> i8 {
    if period == 0 || trend.len() < period {
        return 0;
    }
    let closes = trend.closes();
    let average = last(&ema(&closes, period));
    sign(last(&closes) - average)
}

fn volatility_ratio(atr: &[f64], s: &IndicatorSettings) -> f64 {
    let average = last(&sma_from(
        atr,
        s.atr_period.saturating_sub(1),
        s.volatility_window,
    ));
    if average > 0.0 {
        last(atr) / average
    } else {
        1.0
    }
}

fn scalping_readings(scalping: &[Candle], s: &IndicatorSettings) -> ScalpingSnapshot {
    let closes = scalping.closes();
    let fisher = FisherTransform::new(s.fisher_period).compute(scalping);
    let n = fisher.len();
    let current = last(&fisher);
    let previous = if n >= 2 { fisher[n - 2] } else { Default::default() };

    ScalpingSnapshot {
        laguerre_rsi: LaguerreRsi::new(s.laguerre_gamma)
            .calculate(&closes)
            .last()
            .copied()
            .unwrap_or(50.0),
        fisher: current.fisher,
        fisher_trigger: current.trigger,
        fisher_prev: previous.fisher,
        fisher_trigger_prev: previous.trigger,
        volume: scalping.last().map_or(0.0, |c| c.volume),
        volume_average: last(&sma(&scalping.volumes(), s.volume_period)),
        bar_direction: scalping.last().map_or(0, |c| c.direction()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whalewave_core::types::{DailyLevels, OrderBook, OrderBookLevel};

    const MINUTE: i64 = 60_000;

    fn rising(count: usize, step_ms: i64, slope: f64) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let close = 100.0 + slope * i as f64 + (i as f64 * 0.7).sin() * 0.3;
                let open = close - slope * 0.5;
                Candle::new(
                    i as i64 * step_ms,
                    open,
                    open.max(close) + 0.4,
                    open.min(close) - 0.4,
                    close,
                    1000.0 + (i % 7) as f64 * 50.0,
                )
            })
            .collect()
    }

    fn snapshot() -> MarketSnapshot {
        let primary = rising(200, 15 * MINUTE, 0.5);
        let last = primary[199];
        MarketSnapshot {
            symbol: "BTCUSDT".to_string(),
            timestamp: last.timestamp,
            primary,
            trend: rising(120, 30 * MINUTE, 2.0),
            scalping: rising(600, 5 * MINUTE, 0.2),
            order_book: OrderBook::new(
                vec![OrderBookLevel::new(last.close - 0.5, 80.0)],
                vec![OrderBookLevel::new(last.close + 5.0, 2.0)],
            ),
            last_price: last.close,
            prior_day: DailyLevels {
                high: 120.0,
                low: 100.0,
                close: 110.0,
            },
        }
    }

    #[test]
    fn test_build_uptrend_readings() {
        let ctx = IndicatorContext::build(&snapshot(), &IndicatorSettings::default());

        assert_eq!(ctx.indicators.htf_bias, 1);
        assert_eq!(ctx.indicators.supertrend, 1);
        assert!(ctx.indicators.rsi > 50.0);
        assert!(ctx.indicators.atr > 0.0);
        assert!(ctx.indicators.regression_slope > 0.0);
        assert!(ctx.volatility_ratio > 0.0);
        assert_eq!(ctx.walls.nearest_support(), Some(ctx.close - 0.5));
        assert!(ctx.pivots.is_some());
    }

    #[test]
    fn test_later_bars_are_ignored() {
        let mut snap = snapshot();
        let base = IndicatorContext::build(&snap, &IndicatorSettings::default());

        // A bar after the snapshot time must not change anything
        let mut future = snap.primary[199];
        future.timestamp += 15 * MINUTE;
        future.close *= 2.0;
        future.high = future.close;
        snap.primary.push(future);

        let after = IndicatorContext::build(&snap, &IndicatorSettings::default());
        assert_eq!(base, after);
    }

    #[test]
    fn test_short_trend_series_has_no_bias() {
        let mut snap = snapshot();
        snap.trend.truncate(10);
        let ctx = IndicatorContext::build(&snap, &IndicatorSettings::default());
        assert_eq!(ctx.indicators.htf_bias, 0);
    }

    #[test]
    fn test_oracle_context_carries_levels() {
        let ctx = IndicatorContext::build(&snapshot(), &IndicatorSettings::default());
        let wss = WssResult {
            score: 2.5,
            action_threshold: 2.0,
            ..Default::default()
        };
        let oracle = ctx.oracle_context(&wss, 199.0);

        assert_eq!(oracle.wss_score, 2.5);
        assert_eq!(oracle.pivots.len(), 7);
        assert_eq!(oracle.support_walls.len(), 1);
        assert_eq!(oracle.price, 199.0);
    }
}
