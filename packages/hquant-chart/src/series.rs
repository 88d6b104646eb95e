//! Authoritative base series and classification of its mutations.

use crate::error::{EngineError, Result};
use crate::Bar;

/// How a series differs from its previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesChange {
    Unchanged,
    /// One new trailing bar; everything before it is untouched.
    Append,
    /// Only the last bar's values changed.
    ReviseLast,
    /// Anything else: reload, resolution switch, front trim, older revision.
    Replace,
}

/// Compares two versions of a display series.
pub fn classify(old: &[Bar], new: &[Bar]) -> SeriesChange {
    if old == new {
        return SeriesChange::Unchanged;
    }
    match new.len().checked_sub(old.len()) {
        Some(1) if new[..old.len()] == *old => SeriesChange::Append,
        Some(0) => {
            let n = old.len();
            // n > 0 here: equal empty slices returned above.
            if old[..n - 1] == new[..n - 1] && old[n - 1].time == new[n - 1].time {
                SeriesChange::ReviseLast
            } else {
                SeriesChange::Replace
            }
        }
        _ => SeriesChange::Replace,
    }
}

/// Strictly time-ordered bars with unique timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every bar and the strict time ordering.
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self> {
        for (index, bar) in bars.iter().enumerate() {
            if let Some(reason) = bar.defect() {
                return Err(EngineError::InvalidBar {
                    time: bar.time,
                    reason,
                });
            }
            if index > 0 && bars[index - 1].time >= bar.time {
                return Err(EngineError::UnorderedSeries { index });
            }
        }
        Ok(Self { bars })
    }

    #[inline]
    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Applies one tick: a bar at an existing time overwrites it, a newer bar
    /// is appended. Older bars at unknown times are rejected unchanged.
    pub fn apply(&mut self, bar: Bar) -> Result<SeriesChange> {
        if let Some(reason) = bar.defect() {
            return Err(EngineError::InvalidBar {
                time: bar.time,
                reason,
            });
        }
        let Some(&last) = self.bars.last() else {
            self.bars.push(bar);
            return Ok(SeriesChange::Append);
        };
        if bar.time > last.time {
            self.bars.push(bar);
            return Ok(SeriesChange::Append);
        }
        match self.bars.binary_search_by_key(&bar.time, |b| b.time) {
            Ok(i) if self.bars[i] == bar => Ok(SeriesChange::Unchanged),
            Ok(i) => {
                self.bars[i] = bar;
                if i + 1 == self.bars.len() {
                    Ok(SeriesChange::ReviseLast)
                } else {
                    Ok(SeriesChange::Replace)
                }
            }
            Err(_) => Err(EngineError::OutOfOrderTick {
                time: bar.time,
                last: last.time,
            }),
        }
    }

    /// Drops the oldest bars beyond `max`. Returns how many were dropped.
    pub fn trim_front(&mut self, max: usize) -> usize {
        let excess = self.bars.len().saturating_sub(max);
        self.bars.drain(..excess);
        excess
    }
}
