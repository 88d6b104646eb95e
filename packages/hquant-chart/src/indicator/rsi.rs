//! Relative strength index with Wilder smoothing.

use super::fold_closes;
use crate::{Bar, LinePoint};

#[derive(Debug, Clone)]
pub struct RsiExec {
    period: usize,
    prev_close: Option<f64>,
    deltas: usize,
    // Plain sums over the first `period` deltas (seed).
    seed_gain: f64,
    seed_loss: f64,
    avg_gain: f64,
    avg_loss: f64,
}

impl RsiExec {
    /// Panics if `period == 0`.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "period must be > 0");
        Self {
            period,
            prev_close: None,
            deltas: 0,
            seed_gain: 0.0,
            seed_loss: 0.0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    /// Zero average loss saturates at 100, flat input included.
    #[inline]
    fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return 100.0;
        }
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }

    pub fn next(&mut self, close: f64) -> Option<f64> {
        let prev = self.prev_close.replace(close)?;
        let change = close - prev;
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        self.deltas += 1;
        let p = self.period as f64;
        if self.deltas < self.period {
            self.seed_gain += gain;
            self.seed_loss += loss;
            return None;
        }
        if self.deltas == self.period {
            self.seed_gain += gain;
            self.seed_loss += loss;
            self.avg_gain = self.seed_gain / p;
            self.avg_loss = self.seed_loss / p;
        } else {
            self.avg_gain = (self.avg_gain * (p - 1.0) + gain) / p;
            self.avg_loss = (self.avg_loss * (p - 1.0) + loss) / p;
        }
        Some(Self::rsi_from(self.avg_gain, self.avg_loss))
    }
}

/// RSI of `close`. First value at index `period`; empty if `period == 0` or
/// `bars.len() <= period`.
pub fn rsi(bars: &[Bar], period: usize) -> Vec<LinePoint> {
    if period == 0 || bars.len() <= period {
        return Vec::new();
    }
    let mut exec = RsiExec::new(period);
    fold_closes(bars, |c| exec.next(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_bars::{closes, ramp, wave};

    #[test]
    fn monotonic_rise_is_100() {
        let bars = ramp(10.0, 40);
        let out = rsi(&bars, 14);
        assert_eq!(out.len(), 26);
        assert_eq!(out[0].time, 14);
        assert!(out.iter().all(|p| p.value == 100.0));
    }

    #[test]
    fn monotonic_fall_is_0() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&closes(&values), 14);
        assert!(out.iter().all(|p| p.value == 0.0));
    }

    #[test]
    fn flat_price_is_100() {
        let out = rsi(&closes(&[5.0; 20]), 14);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|p| p.value == 100.0));
    }

    #[test]
    fn bounded() {
        let out = rsi(&wave(300), 14);
        assert!(!out.is_empty());
        assert!(out.iter().all(|p| (0.0..=100.0).contains(&p.value)));
    }

    #[test]
    fn seed_and_wilder_step() {
        // deltas: +1, -1, +2 -> seed avg gain 1, avg loss 1/3 (period 3)
        let bars = closes(&[10.0, 11.0, 10.0, 12.0, 11.0]);
        let out = rsi(&bars, 3);
        assert_eq!(out.len(), 2);
        let rs0: f64 = 1.0 / (1.0 / 3.0);
        assert!((out[0].value - (100.0 - 100.0 / (1.0 + rs0))).abs() < 1e-12);
        // next delta -1: gain (1*2 + 0)/3, loss (1/3*2 + 1)/3
        let g = 2.0 / 3.0;
        let l = (2.0 / 3.0 + 1.0) / 3.0;
        assert!((out[1].value - (100.0 - 100.0 / (1.0 + g / l))).abs() < 1e-12);
    }

    #[test]
    fn needs_period_plus_one_bars() {
        assert!(rsi(&ramp(1.0, 14), 14).is_empty());
        assert_eq!(rsi(&ramp(1.0, 15), 14).len(), 1);
        assert!(rsi(&ramp(1.0, 15), 0).is_empty());
    }
}
