//! Bollinger bands: SMA middle, population standard deviation envelope.

use super::SmaExec;
use crate::{Bar, LinePoint};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone)]
pub struct BollExec {
    sma: SmaExec,
    multiplier: f64,
}

impl BollExec {
    /// Panics if `period == 0`.
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self {
            sma: SmaExec::new(period),
            multiplier,
        }
    }

    pub fn next(&mut self, close: f64) -> Option<BandValue> {
        let middle = self.sma.next(close)?;
        let window = self.sma.window();
        // Divide by `period`, not `period - 1`.
        let variance = window
            .iter()
            .map(|x| {
                let d = x - middle;
                d * d
            })
            .sum::<f64>()
            / window.len() as f64;
        let width = self.multiplier * variance.sqrt();
        Some(BandValue {
            upper: middle + width,
            middle,
            lower: middle - width,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BandSeries {
    pub upper: Vec<LinePoint>,
    pub middle: Vec<LinePoint>,
    pub lower: Vec<LinePoint>,
}

impl BandSeries {
    pub(crate) fn record(&mut self, time: i64, v: BandValue) {
        self.upper.push(LinePoint::new(time, v.upper));
        self.middle.push(LinePoint::new(time, v.middle));
        self.lower.push(LinePoint::new(time, v.lower));
    }
}

/// Bollinger bands of `close`. Empty when `period == 0`, the multiplier is
/// negative or non-finite, or `bars.len() < period`.
pub fn bollinger_bands(bars: &[Bar], period: usize, multiplier: f64) -> BandSeries {
    let mut out = BandSeries::default();
    if period == 0 || bars.len() < period || !multiplier.is_finite() || multiplier < 0.0 {
        return out;
    }
    let mut exec = BollExec::new(period, multiplier);
    for bar in bars {
        if let Some(v) = exec.next(bar.close) {
            out.record(bar.time, v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::sma;
    use crate::indicator::test_bars::{closes, wave};

    #[test]
    fn population_std_dev() {
        let bars = closes(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let b = bollinger_bands(&bars, 5, 2.0);
        assert_eq!(b.middle, vec![LinePoint::new(4, 30.0)]);
        let std = (200.0f64).sqrt(); // (400 + 100 + 0 + 100 + 400) / 5
        assert!((b.upper[0].value - (30.0 + 2.0 * std)).abs() < 1e-12);
        assert!((b.lower[0].value - (30.0 - 2.0 * std)).abs() < 1e-12);
    }

    #[test]
    fn middle_is_sma() {
        let bars = wave(100);
        let b = bollinger_bands(&bars, 20, 2.0);
        assert_eq!(b.middle, sma(&bars, 20));
    }

    #[test]
    fn bands_are_symmetric() {
        let b = bollinger_bands(&wave(60), 10, 1.5);
        for ((u, m), l) in b.upper.iter().zip(&b.middle).zip(&b.lower) {
            assert_eq!(u.time, m.time);
            assert!(((u.value - m.value) - (m.value - l.value)).abs() < 1e-9);
            assert!(u.value >= l.value);
        }
    }

    #[test]
    fn flat_input_collapses() {
        let b = bollinger_bands(&closes(&[7.0; 8]), 4, 2.0);
        assert!(b.upper.iter().zip(&b.lower).all(|(u, l)| u.value == 7.0 && l.value == 7.0));
    }

    #[test]
    fn outlier_leaving_window_restores_flat_band() {
        let b = bollinger_bands(&closes(&[1e16, 0.3, 0.3, 0.3, 0.3, 0.3]), 2, 2.0);
        for band in [&b.upper, &b.middle, &b.lower] {
            assert!(band[1..].iter().all(|p| p.value == 0.3), "{band:?}");
        }
    }

    #[test]
    fn rejects_invalid() {
        let bars = wave(30);
        assert_eq!(bollinger_bands(&bars, 0, 2.0), BandSeries::default());
        assert_eq!(bollinger_bands(&bars, 31, 2.0), BandSeries::default());
        assert_eq!(bollinger_bands(&bars, 5, f64::NAN), BandSeries::default());
        assert_eq!(bollinger_bands(&bars, 5, -1.0), BandSeries::default());
    }
}
