//! Indicator math.
//!
//! Every indicator is an executor fed one bar at a time (`*Exec::next`). The
//! batch functions (`sma`, `ema`, `vwap`, `rsi`, `macd`, `bollinger_bands`)
//! are plain folds of those executors, so extending a series bar-by-bar and
//! recomputing it from scratch produce bit-identical values.

mod boll;
mod ma;
mod macd;
mod rsi;
mod vwap;

pub use boll::{bollinger_bands, BandSeries, BandValue, BollExec};
pub use ma::{ema, sma, EmaExec, SmaExec};
pub use macd::{macd, MacdExec, MacdSeries, MacdStep};
pub use rsi::{rsi, RsiExec};
pub use vwap::{vwap, VwapExec};

use crate::{Bar, LinePoint};
use core::fmt;
use serde::Serialize;

pub const DEFAULT_SMA_PERIOD: usize = 20;
pub const DEFAULT_EMA_PERIOD: usize = 12;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;
pub const DEFAULT_BOLL_PERIOD: usize = 20;
pub const DEFAULT_BOLL_MULTIPLIER: f64 = 2.0;

/// Indicator family without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KindTag {
    Sma,
    Ema,
    Vwap,
    Rsi,
    Macd,
    BollingerBands,
}

impl KindTag {
    /// Case-insensitive; ignores `-`, `_` and spaces. Accepts `bollinger`/`bb`.
    pub fn parse(s: &str) -> Option<Self> {
        let norm: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let tag = match norm.as_str() {
            "sma" => Self::Sma,
            "ema" => Self::Ema,
            "vwap" => Self::Vwap,
            "rsi" => Self::Rsi,
            "macd" => Self::Macd,
            "bollingerbands" | "bollinger" | "bb" | "boll" => Self::BollingerBands,
            _ => return None,
        };
        Some(tag)
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sma => "SMA",
            Self::Ema => "EMA",
            Self::Vwap => "VWAP",
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::BollingerBands => "BollingerBands",
        };
        f.write_str(name)
    }
}

/// Indicator kind with its validated parameters.
///
/// A period of `0` marks an invalid parameter: the indicator stays
/// configured but always yields an empty series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IndicatorKind {
    Sma {
        period: usize,
    },
    Ema {
        period: usize,
    },
    Vwap,
    Rsi {
        period: usize,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    BollingerBands {
        period: usize,
        multiplier: f64,
    },
}

impl IndicatorKind {
    pub fn defaults(tag: KindTag) -> Self {
        match tag {
            KindTag::Sma => Self::Sma {
                period: DEFAULT_SMA_PERIOD,
            },
            KindTag::Ema => Self::Ema {
                period: DEFAULT_EMA_PERIOD,
            },
            KindTag::Vwap => Self::Vwap,
            KindTag::Rsi => Self::Rsi {
                period: DEFAULT_RSI_PERIOD,
            },
            KindTag::Macd => Self::Macd {
                fast: DEFAULT_MACD_FAST,
                slow: DEFAULT_MACD_SLOW,
                signal: DEFAULT_MACD_SIGNAL,
            },
            KindTag::BollingerBands => Self::BollingerBands {
                period: DEFAULT_BOLL_PERIOD,
                multiplier: DEFAULT_BOLL_MULTIPLIER,
            },
        }
    }

    pub fn tag(&self) -> KindTag {
        match self {
            Self::Sma { .. } => KindTag::Sma,
            Self::Ema { .. } => KindTag::Ema,
            Self::Vwap => KindTag::Vwap,
            Self::Rsi { .. } => KindTag::Rsi,
            Self::Macd { .. } => KindTag::Macd,
            Self::BollingerBands { .. } => KindTag::BollingerBands,
        }
    }

    /// Bars needed before the first output; `None` if a parameter is invalid.
    pub fn min_len(&self) -> Option<usize> {
        let nz = |p: usize| (p > 0).then_some(p);
        match *self {
            Self::Sma { period } | Self::Ema { period } => nz(period),
            Self::Vwap => Some(1),
            Self::Rsi { period } => nz(period).map(|p| p + 1),
            Self::Macd { fast, slow, signal } => {
                let longest = nz(fast)?.max(nz(slow)?);
                Some(longest + nz(signal)? - 1)
            }
            Self::BollingerBands { period, multiplier } => {
                if multiplier.is_finite() && multiplier >= 0.0 {
                    nz(period)
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    pub fn is_computable(&self, len: usize) -> bool {
        self.min_len().is_some_and(|m| len >= m)
    }

    pub fn placement(&self) -> Placement {
        match self {
            Self::Sma { .. } | Self::Ema { .. } | Self::Vwap | Self::BollingerBands { .. } => {
                Placement::Overlay
            }
            Self::Rsi { .. } => Placement::Pane {
                scale: Scale::Bounded {
                    min: 0.0,
                    max: 100.0,
                },
            },
            Self::Macd { .. } => Placement::Pane {
                scale: Scale::Unbounded,
            },
        }
    }

    pub(crate) fn exec(&self) -> Exec {
        if self.min_len().is_none() {
            return Exec::Inert;
        }
        match *self {
            Self::Sma { period } => Exec::Sma(SmaExec::new(period)),
            Self::Ema { period } => Exec::Ema(EmaExec::new(period)),
            Self::Vwap => Exec::Vwap(VwapExec::new()),
            Self::Rsi { period } => Exec::Rsi(RsiExec::new(period)),
            Self::Macd { fast, slow, signal } => Exec::Macd(MacdExec::new(fast, slow, signal)),
            Self::BollingerBands { period, multiplier } => {
                Exec::Boll(BollExec::new(period, multiplier))
            }
        }
    }

    /// Full computation over `bars`. Empty when `bars` is shorter than
    /// [`min_len`](Self::min_len) or a parameter is invalid.
    pub fn compute(&self, bars: &[Bar]) -> SeriesData {
        let mut data = SeriesData::empty_for(self);
        if !self.is_computable(bars.len()) {
            return data;
        }
        let mut exec = self.exec();
        for bar in bars {
            data.record(bar.time, exec.push(bar));
        }
        data
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sma { period } | Self::Ema { period } | Self::Rsi { period } => {
                write!(f, "{}({period})", self.tag())
            }
            Self::Vwap => write!(f, "VWAP"),
            Self::Macd { fast, slow, signal } => write!(f, "MACD({fast}, {slow}, {signal})"),
            Self::BollingerBands { period, multiplier } => {
                write!(f, "BollingerBands({period}, {multiplier})")
            }
        }
    }
}

/// Where the host should draw a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "placement", rename_all = "camelCase")]
pub enum Placement {
    /// On the price scale.
    Overlay,
    /// In a separate pane with its own scale.
    Pane { scale: Scale },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Scale {
    Bounded { min: f64, max: f64 },
    Unbounded,
}

/// Realized output of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum SeriesData {
    Line { points: Vec<LinePoint> },
    Macd(MacdSeries),
    Bands(BandSeries),
}

impl SeriesData {
    pub fn empty_for(kind: &IndicatorKind) -> Self {
        match kind {
            IndicatorKind::Macd { .. } => Self::Macd(MacdSeries::default()),
            IndicatorKind::BollingerBands { .. } => Self::Bands(BandSeries::default()),
            _ => Self::Line { points: Vec::new() },
        }
    }

    /// `true` when no sub-series holds a point.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Line { points } => points.is_empty(),
            Self::Macd(m) => m.macd.is_empty() && m.signal.is_empty() && m.histogram.is_empty(),
            Self::Bands(b) => b.middle.is_empty(),
        }
    }

    pub fn as_line(&self) -> Option<&[LinePoint]> {
        match self {
            Self::Line { points } => Some(points),
            _ => None,
        }
    }

    pub fn as_macd(&self) -> Option<&MacdSeries> {
        match self {
            Self::Macd(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bands(&self) -> Option<&BandSeries> {
        match self {
            Self::Bands(b) => Some(b),
            _ => None,
        }
    }

    pub(crate) fn record(&mut self, time: i64, step: Step) {
        match (self, step) {
            (Self::Line { points }, Step::Line(Some(v))) => points.push(LinePoint::new(time, v)),
            (Self::Macd(m), Step::Macd(s)) => m.record(time, s),
            (Self::Bands(b), Step::Bands(Some(v))) => b.record(time, v),
            (_, Step::Line(None) | Step::Bands(None) | Step::Idle) => {}
            (data, step) => debug_assert!(false, "step {step:?} does not fit {data:?}"),
        }
    }

    /// Drops every point at or after `time`.
    pub(crate) fn truncate_from(&mut self, time: i64) {
        match self {
            Self::Line { points } => truncate_points(points, time, |p| p.time),
            Self::Macd(m) => {
                truncate_points(&mut m.macd, time, |p| p.time);
                truncate_points(&mut m.signal, time, |p| p.time);
                truncate_points(&mut m.histogram, time, |p| p.time);
            }
            Self::Bands(b) => {
                truncate_points(&mut b.upper, time, |p| p.time);
                truncate_points(&mut b.middle, time, |p| p.time);
                truncate_points(&mut b.lower, time, |p| p.time);
            }
        }
    }
}

fn truncate_points<T>(points: &mut Vec<T>, time: i64, time_of: impl Fn(&T) -> i64) {
    while points.last().is_some_and(|p| time_of(p) >= time) {
        points.pop();
    }
}

/// Output of one executor for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Step {
    Line(Option<f64>),
    Macd(MacdStep),
    Bands(Option<BandValue>),
    Idle,
}

/// Incremental executor state for one indicator kind.
#[derive(Debug, Clone)]
pub(crate) enum Exec {
    Sma(SmaExec),
    Ema(EmaExec),
    Vwap(VwapExec),
    Rsi(RsiExec),
    Macd(MacdExec),
    Boll(BollExec),
    /// Invalid parameters; never produces output.
    Inert,
}

impl Exec {
    #[inline]
    pub(crate) fn push(&mut self, bar: &Bar) -> Step {
        match self {
            Self::Sma(e) => Step::Line(e.next(bar.close)),
            Self::Ema(e) => Step::Line(e.next(bar.close)),
            Self::Vwap(e) => Step::Line(e.next(bar)),
            Self::Rsi(e) => Step::Line(e.next(bar.close)),
            Self::Macd(e) => Step::Macd(e.next(bar.close)),
            Self::Boll(e) => Step::Bands(e.next(bar.close)),
            Self::Inert => Step::Idle,
        }
    }
}

fn fold_closes(bars: &[Bar], mut next: impl FnMut(f64) -> Option<f64>) -> Vec<LinePoint> {
    bars.iter()
        .filter_map(|b| next(b.close).map(|v| LinePoint::new(b.time, v)))
        .collect()
}
