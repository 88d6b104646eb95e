use serde::{Deserialize, Serialize};

/// One OHLCV bar. `time` is epoch seconds and is the join key for every
/// derived series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar with all four prices equal to `close`.
    pub fn flat(time: i64, close: f64, volume: f64) -> Self {
        Self::new(time, close, close, close, close, volume)
    }

    /// `(high + low + close) / 3`
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Returns why the bar cannot enter a series, if it cannot.
    pub(crate) fn defect(&self) -> Option<&'static str> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Some("non-finite price");
        }
        if !self.volume.is_finite() {
            return Some("non-finite volume");
        }
        if self.volume < 0.0 {
            return Some("negative volume");
        }
        None
    }
}

/// A single `{time, value}` sample of a line series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub time: i64,
    pub value: f64,
}

impl LinePoint {
    #[inline]
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistogramTone {
    Positive,
    Negative,
}

/// MACD histogram sample, tagged for two-colour display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramPoint {
    pub time: i64,
    pub value: f64,
    pub tone: HistogramTone,
}

impl HistogramPoint {
    pub fn new(time: i64, value: f64) -> Self {
        let tone = if value >= 0.0 {
            HistogramTone::Positive
        } else {
            HistogramTone::Negative
        };
        Self { time, value, tone }
    }
}
