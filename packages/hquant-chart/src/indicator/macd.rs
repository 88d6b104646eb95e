//! MACD = EMA(fast) - EMA(slow)
//! Signal = EMA(MACD, signal_period), seeded like any EMA
//! Histogram = MACD - Signal

use super::EmaExec;
use crate::{Bar, HistogramPoint, LinePoint};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacdStep {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct MacdExec {
    fast: EmaExec,
    slow: EmaExec,
    signal: EmaExec,
}

impl MacdExec {
    /// Panics if any period is 0.
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast: EmaExec::new(fast),
            slow: EmaExec::new(slow),
            signal: EmaExec::new(signal),
        }
    }

    #[inline]
    pub fn next(&mut self, close: f64) -> MacdStep {
        // Both EMAs advance on every bar, whether or not the other is seeded.
        let fast = self.fast.next(close);
        let slow = self.slow.next(close);
        let macd = match (fast, slow) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        };
        let signal = macd.and_then(|m| self.signal.next(m));
        MacdStep { macd, signal }
    }
}

/// Three parallel MACD sequences.
///
/// `signal` and `histogram` share one time axis: the times where line and
/// signal both exist. The `macd` line keeps its full inner join of the two
/// EMAs, so its axis starts `signal - 1` bars earlier and ends at the same
/// time. Hosts that need three equal-length columns slice `macd` by the
/// length difference.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacdSeries {
    pub macd: Vec<LinePoint>,
    pub signal: Vec<LinePoint>,
    pub histogram: Vec<HistogramPoint>,
}

impl MacdSeries {
    pub(crate) fn record(&mut self, time: i64, step: MacdStep) {
        let Some(macd) = step.macd else {
            return;
        };
        self.macd.push(LinePoint::new(time, macd));
        if let Some(signal) = step.signal {
            self.signal.push(LinePoint::new(time, signal));
            self.histogram.push(HistogramPoint::new(time, macd - signal));
        }
    }
}

/// MACD of `close`. All three sequences are empty unless
/// `bars.len() >= max(fast, slow) + signal - 1` and every period is positive.
pub fn macd(bars: &[Bar], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let mut out = MacdSeries::default();
    if fast == 0 || slow == 0 || signal == 0 || bars.len() < fast.max(slow) + signal - 1 {
        return out;
    }
    let mut exec = MacdExec::new(fast, slow, signal);
    for bar in bars {
        out.record(bar.time, exec.next(bar.close));
    }
    out
}
