//! Simple and exponential moving averages of the close.

use super::fold_closes;
use crate::circular::RingWindow;
use crate::{Bar, LinePoint};

/// Rolling mean over the trailing `period` values.
///
/// The sum is rebuilt from the window whenever a value falls out, so a large
/// outlier leaving the window cannot strand rounding error in later means.
#[derive(Debug, Clone)]
pub struct SmaExec {
    window: RingWindow,
    sum: f64,
}

impl SmaExec {
    /// Panics if `period == 0`.
    pub fn new(period: usize) -> Self {
        Self {
            window: RingWindow::new(period),
            sum: 0.0,
        }
    }

    #[inline]
    pub fn period(&self) -> usize {
        self.window.capacity()
    }

    #[inline]
    pub fn next(&mut self, value: f64) -> Option<f64> {
        match self.window.push(value) {
            Some(_) => self.sum = self.window.iter().sum(),
            None => self.sum += value,
        }
        self.window
            .is_full()
            .then(|| self.sum / self.period() as f64)
    }

    /// Trailing inputs, oldest first.
    pub(crate) fn window(&self) -> &RingWindow {
        &self.window
    }
}

/// EMA with multiplier `2 / (period + 1)`, seeded by the SMA of the first
/// `period` values.
#[derive(Debug, Clone)]
pub struct EmaExec {
    seed: SmaExec,
    multiplier: f64,
    value: Option<f64>,
}

impl EmaExec {
    /// Panics if `period == 0`.
    pub fn new(period: usize) -> Self {
        Self {
            seed: SmaExec::new(period),
            multiplier: 2.0 / (period as f64 + 1.0),
            value: None,
        }
    }

    #[inline]
    pub fn next(&mut self, value: f64) -> Option<f64> {
        let next = match self.value {
            None => self.seed.next(value),
            Some(prev) => Some((value - prev) * self.multiplier + prev),
        };
        self.value = next;
        next
    }
}

/// Simple moving average of `close`. Empty if `period == 0` or
/// `bars.len() < period`.
pub fn sma(bars: &[Bar], period: usize) -> Vec<LinePoint> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }
    let mut exec = SmaExec::new(period);
    fold_closes(bars, |c| exec.next(c))
}

/// Exponential moving average of `close`. Empty if `period == 0` or
/// `bars.len() < period`.
pub fn ema(bars: &[Bar], period: usize) -> Vec<LinePoint> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }
    let mut exec = EmaExec::new(period);
    fold_closes(bars, |c| exec.next(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_bars::{closes, ramp, wave};

    #[test]
    fn sma_on_linear_ramp() {
        // closes 10, 11, ..., 29
        let bars = ramp(10.0, 20);
        let out = sma(&bars, 5);
        assert_eq!(out.len(), 16);
        assert_eq!(out[0], LinePoint::new(4, 12.0));
        assert_eq!(out[15], LinePoint::new(19, 27.0));
    }

    #[test]
    fn sma_length_law() {
        let bars = wave(40);
        for period in 1..=45 {
            let expected = (bars.len() + 1).saturating_sub(period);
            assert_eq!(sma(&bars, period).len(), expected, "period {period}");
        }
        assert!(sma(&bars, 0).is_empty());
    }

    #[test]
    fn sma_window_slides() {
        let mut exec = SmaExec::new(3);
        assert_eq!(exec.next(10.0), None);
        assert_eq!(exec.next(20.0), None);
        assert_eq!(exec.next(30.0), Some(20.0));
        assert_eq!(exec.next(40.0), Some(30.0));
    }

    #[test]
    fn sma_recovers_after_outlier_leaves() {
        let bars = closes(&[1e16, 0.3, 0.3, 0.3, 0.3, 0.3]);
        let out: Vec<f64> = sma(&bars, 2).iter().map(|p| p.value).collect();
        assert_eq!(out[1..], [0.3; 4]);
    }

    #[test]
    fn ema_seed_is_sma() {
        let bars = wave(50);
        let e = ema(&bars, 10);
        let s = sma(&bars, 10);
        assert_eq!(e[0], s[0]);
        assert_eq!(e.len(), s.len());
    }

    #[test]
    fn ema_recurrence() {
        // EMA(3): multiplier 0.5, seed (2 + 4 + 6) / 3 = 4
        let bars = closes(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let out: Vec<f64> = ema(&bars, 3).iter().map(|p| p.value).collect();
        assert_eq!(out, vec![4.0, 6.0, 8.0]);
    }

    #[test]
    fn ema_period_one_tracks_close() {
        let bars = closes(&[3.0, 9.0, 1.0]);
        let out: Vec<f64> = ema(&bars, 1).iter().map(|p| p.value).collect();
        assert_eq!(out, vec![3.0, 9.0, 1.0]);
    }

    #[test]
    fn short_input_is_empty() {
        let bars = ramp(1.0, 4);
        assert!(sma(&bars, 5).is_empty());
        assert!(ema(&bars, 5).is_empty());
    }

    #[test]
    fn times_follow_source() {
        let bars = wave(30);
        let out = ema(&bars, 7);
        for (p, b) in out.iter().zip(&bars[6..]) {
            assert_eq!(p.time, b.time);
        }
    }
}
