//! Time-bucket re-aggregation of an ordered bar series.

use crate::period::Period;
use crate::Bar;

/// Candle under construction for one bucket.
#[derive(Debug, Clone, Copy)]
struct BucketCandle {
    open_time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl BucketCandle {
    fn new(open_time: i64, bar: &Bar) -> Self {
        Self {
            open_time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    fn merge(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
    }

    fn into_bar(self) -> Bar {
        Bar::new(
            self.open_time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }
}

/// Folds time-ordered `bars` into `interval_secs` buckets.
///
/// Consecutive bars sharing `floor(time / interval) * interval` form one
/// bucket: first open, max high, min low, last close, summed volume. The
/// output time is the bucket key. Returns an empty series for an empty input
/// or a non-positive interval.
pub fn aggregate(bars: &[Bar], interval_secs: i64) -> Vec<Bar> {
    match Period::from_secs(interval_secs) {
        Some(period) => aggregate_period(bars, period),
        None => Vec::new(),
    }
}

pub fn aggregate_period(bars: &[Bar], period: Period) -> Vec<Bar> {
    let mut out = Vec::new();
    let mut current: Option<BucketCandle> = None;

    for bar in bars {
        let key = period.bucket_start(bar.time);
        if let Some(cur) = current.as_mut() {
            if cur.open_time == key {
                cur.merge(bar);
                continue;
            }
        }
        if let Some(done) = current.replace(BucketCandle::new(key, bar)) {
            out.push(done.into_bar());
        }
    }
    if let Some(done) = current {
        out.push(done.into_bar());
    }
    out
}
