//! Volume-weighted average price, cumulative from the first bar.

use crate::{Bar, LinePoint};

#[derive(Debug, Clone, Default)]
pub struct VwapExec {
    cum_tpv: f64,
    cum_volume: f64,
}

impl VwapExec {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while no volume has traded yet.
    #[inline]
    pub fn next(&mut self, bar: &Bar) -> Option<f64> {
        self.cum_tpv += bar.typical_price() * bar.volume;
        self.cum_volume += bar.volume;
        (self.cum_volume > 0.0).then(|| self.cum_tpv / self.cum_volume)
    }
}

/// Running VWAP from `bars[0]`; a point for every bar once cumulative volume
/// is positive.
pub fn vwap(bars: &[Bar]) -> Vec<LinePoint> {
    let mut exec = VwapExec::new();
    bars.iter()
        .filter_map(|b| exec.next(b).map(|v| LinePoint::new(b.time, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_typical_price_by_volume() {
        let bars = [
            Bar::new(0, 0.0, 12.0, 6.0, 9.0, 10.0), // tp 9
            Bar::new(1, 0.0, 15.0, 9.0, 12.0, 30.0), // tp 12
        ];
        let out = vwap(&bars);
        assert_eq!(out[0], LinePoint::new(0, 9.0));
        assert_eq!(out[1], LinePoint::new(1, (9.0 * 10.0 + 12.0 * 30.0) / 40.0));
    }

    #[test]
    fn skips_until_volume_trades() {
        let bars = [
            Bar::flat(0, 5.0, 0.0),
            Bar::flat(1, 6.0, 0.0),
            Bar::flat(2, 7.0, 2.0),
            Bar::flat(3, 8.0, 0.0),
        ];
        let out = vwap(&bars);
        let times: Vec<i64> = out.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![2, 3]);
        assert_eq!(out[1].value, 7.0);
    }

    #[test]
    fn empty_input() {
        assert!(vwap(&[]).is_empty());
    }
}
