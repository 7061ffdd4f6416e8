//! Technical indicators for the WhaleWave scoring pipeline.
//!
//! Every indicator maps a series of length N to a series of length N. Bars
//! before an indicator's warm-up hold a neutral value (0, or trend +1 with a
//! zero stop for the stop systems) so downstream code never sees NaN.
//!
//! - Smoothing (SMA, EMA, Wilder) and rolling extremes
//! - Momentum (RSI, MACD, Stochastic, CCI, MFI)
//! - Trend strength (ADX, Choppiness, linear regression)
//! - Volatility (ATR, Bollinger, Keltner, squeeze, historical volatility)
//! - Stop systems (SuperTrend, Chandelier Exit, Parabolic SAR)
//! - Volume (OBV, VWAP)
//! - Price action (fair-value gaps, RSI divergence, Fibonacci pivots)
//! - Oscillators (Fisher, Laguerre RSI, Ichimoku)
//! - Order book walls
//!
//! Window sums and deviations use SIMD kernels from [`simd`].

pub mod momentum;
pub mod order_book;
pub mod oscillators;
pub mod patterns;
pub mod simd;
pub mod smoothing;
pub mod stops;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use momentum::{Cci, Macd, MacdOutput, Mfi, Rsi, Stochastic, StochasticOutput};
pub use order_book::{detect_walls, Wall, WallLevels};
pub use oscillators::{FisherOutput, FisherTransform, Ichimoku, IchimokuOutput, LaguerreRsi};
pub use patterns::{Divergence, FairValueGap, FairValueGaps, GapKind, PivotLevels};
pub use smoothing::{ema, rolling_max, rolling_min, sma, wilder, Ema, Sma};
pub use stops::{ChandelierExit, ParabolicSar, StopOutput, SuperTrend};
pub use trend::{Adx, AdxOutput, Choppiness, LinearRegression, RegressionOutput};
pub use volatility::{
    Atr, BollingerBands, BollingerOutput, HistoricalVolatility, KeltnerChannel, KeltnerOutput,
    Squeeze,
};
pub use volume::{Obv, Vwap};

pub use whalewave_core::traits::{CandleIndicator, Indicator};
