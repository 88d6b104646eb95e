//! Owns the base series and the (optionally aggregated) display series
//! derived from it, and reports how each mutation changed the display series.

use crate::aggregator::aggregate_period;
use crate::error::{EngineError, Result};
use crate::period::Period;
use crate::series::{classify, BarSeries, SeriesChange};
use crate::Bar;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
struct Aggregated {
    period: Period,
    bars: Vec<Bar>,
}

#[derive(Debug, Clone, Default)]
pub struct StreamingUpdateHandler {
    base: BarSeries,
    aggregated: Option<Aggregated>,
    max_bars: Option<usize>,
}

impl StreamingUpdateHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `max_bars` base bars, dropping the oldest.
    pub fn with_max_bars(max_bars: Option<usize>) -> Self {
        Self {
            max_bars,
            ..Self::default()
        }
    }

    pub fn base(&self) -> &[Bar] {
        self.base.as_slice()
    }

    /// Series the indicators are computed from.
    pub fn display(&self) -> &[Bar] {
        match &self.aggregated {
            Some(agg) => &agg.bars,
            None => self.base.as_slice(),
        }
    }

    pub fn interval(&self) -> Option<Period> {
        self.aggregated.as_ref().map(|a| a.period)
    }

    /// Replaces the base series. Invalid input leaves state untouched.
    pub fn load(&mut self, bars: Vec<Bar>) -> Result<SeriesChange> {
        let mut base = BarSeries::from_bars(bars)?;
        if let Some(max) = self.max_bars {
            base.trim_front(max);
        }
        self.base = base;
        self.rebuild_aggregate();
        debug!(bars = self.base.len(), display = self.display().len(), "base series loaded");
        Ok(SeriesChange::Replace)
    }

    pub fn apply_tick(&mut self, bar: Bar) -> Result<SeriesChange> {
        let change = match self.base.apply(bar) {
            Ok(change) => change,
            Err(e) => {
                warn!(time = bar.time, error = %e, "tick rejected");
                return Err(e);
            }
        };
        let trimmed = match self.max_bars {
            Some(max) => self.base.trim_front(max),
            None => 0,
        };
        if change == SeriesChange::Unchanged {
            return Ok(change);
        }
        let change = match self.aggregated.as_mut() {
            Some(agg) => {
                let bars = aggregate_period(self.base.as_slice(), agg.period);
                let change = classify(&agg.bars, &bars);
                agg.bars = bars;
                change
            }
            None if trimmed > 0 => SeriesChange::Replace,
            None => change,
        };
        trace!(time = bar.time, ?change, trimmed, "tick applied");
        Ok(change)
    }

    /// Switches the display series to `seconds`-wide buckets.
    pub fn set_interval(&mut self, seconds: i64) -> Result<SeriesChange> {
        let period = Period::from_secs(seconds).ok_or(EngineError::InvalidInterval(seconds))?;
        self.aggregated = Some(Aggregated {
            period,
            bars: aggregate_period(self.base.as_slice(), period),
        });
        debug!(%period, display = self.display().len(), "aggregation interval set");
        Ok(SeriesChange::Replace)
    }

    /// Returns to the base resolution.
    pub fn clear_interval(&mut self) -> SeriesChange {
        match self.aggregated.take() {
            Some(agg) => {
                debug!(period = %agg.period, "aggregation interval cleared");
                SeriesChange::Replace
            }
            None => SeriesChange::Unchanged,
        }
    }

    fn rebuild_aggregate(&mut self) {
        if let Some(agg) = self.aggregated.as_mut() {
            agg.bars = aggregate_period(self.base.as_slice(), agg.period);
        }
    }
}
