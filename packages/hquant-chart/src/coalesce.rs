//! Presentation throttle: merges effects per series id and releases at most
//! one batch per time window. Timestamps are supplied by the caller.

use crate::config::IndicatorId;
use crate::indicator::SeriesData;
use crate::protocol::SeriesEffect;

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Created(SeriesEffect),
    Updated(SeriesEffect),
    Removed,
    /// The host still shows the old series; it must be dropped first.
    Recreated(SeriesEffect),
}

fn with_data(mut created: SeriesEffect, new_data: SeriesData) -> SeriesEffect {
    if let SeriesEffect::SeriesCreated { data, .. } = &mut created {
        *data = new_data;
    }
    created
}

impl Slot {
    fn from_effect(effect: SeriesEffect) -> Self {
        match effect {
            SeriesEffect::SeriesCreated { .. } => Self::Created(effect),
            SeriesEffect::SeriesUpdated { .. } => Self::Updated(effect),
            SeriesEffect::SeriesRemoved { .. } => Self::Removed,
        }
    }

    /// `None` when the two cancel out.
    fn merge(self, next: SeriesEffect) -> Option<Self> {
        use SeriesEffect::*;
        let slot = match (self, next) {
            (Self::Created(c), SeriesUpdated { data, .. }) => Self::Created(with_data(c, data)),
            (Self::Created(_), SeriesRemoved { .. }) => return None,
            (Self::Created(_), c @ SeriesCreated { .. }) => Self::Created(c),

            (Self::Updated(_), u @ SeriesUpdated { .. }) => Self::Updated(u),
            (Self::Updated(_), SeriesRemoved { .. }) => Self::Removed,
            (Self::Updated(_), c @ SeriesCreated { .. }) => Self::Recreated(c),

            (Self::Removed, c @ SeriesCreated { .. }) => Self::Recreated(c),
            (Self::Removed, _) => Self::Removed,

            (Self::Recreated(c), SeriesUpdated { data, .. }) => Self::Recreated(with_data(c, data)),
            (Self::Recreated(_), SeriesRemoved { .. }) => Self::Removed,
            (Self::Recreated(_), c @ SeriesCreated { .. }) => Self::Recreated(c),
        };
        Some(slot)
    }
}

#[derive(Debug, Clone)]
pub struct EffectCoalescer {
    min_interval_ms: u64,
    /// First-arrival order per id.
    pending: Vec<(IndicatorId, Slot)>,
    last_release_ms: Option<u64>,
}

impl EffectCoalescer {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            pending: Vec::new(),
            last_release_ms: None,
        }
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    /// Number of ids with a pending change.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn push(&mut self, effect: SeriesEffect) {
        let id = effect.id().clone();
        match self.pending.iter().position(|(pid, _)| *pid == id) {
            Some(i) => {
                let (_, slot) = self.pending.remove(i);
                if let Some(merged) = slot.merge(effect) {
                    self.pending.insert(i, (id, merged));
                }
            }
            None => self.pending.push((id, Slot::from_effect(effect))),
        }
    }

    pub fn extend(&mut self, effects: impl IntoIterator<Item = SeriesEffect>) {
        for effect in effects {
            self.push(effect);
        }
    }

    /// Releases the merged batch if the window since the last release has
    /// elapsed at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Option<Vec<SeriesEffect>> {
        if self.pending.is_empty() {
            return None;
        }
        let due = self
            .last_release_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.min_interval_ms);
        if !due {
            return None;
        }
        self.last_release_ms = Some(now_ms);
        Some(self.drain())
    }

    /// Releases everything pending now, regardless of the window.
    pub fn flush(&mut self) -> Vec<SeriesEffect> {
        self.drain()
    }

    /// Removals first, then creations and updates in arrival order.
    fn drain(&mut self) -> Vec<SeriesEffect> {
        let pending = std::mem::take(&mut self.pending);
        let mut removals = Vec::new();
        let mut rest = Vec::new();
        for (id, slot) in pending {
            match slot {
                Slot::Removed => removals.push(SeriesEffect::SeriesRemoved { id }),
                Slot::Recreated(created) => {
                    removals.push(SeriesEffect::SeriesRemoved { id });
                    rest.push(created);
                }
                Slot::Created(effect) | Slot::Updated(effect) => rest.push(effect),
            }
        }
        removals.extend(rest);
        removals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::IndicatorKind;
    use crate::LinePoint;

    fn line(v: f64) -> SeriesData {
        SeriesData::Line {
            points: vec![LinePoint::new(0, v)],
        }
    }

    fn created(id: &str, v: f64) -> SeriesEffect {
        let kind = IndicatorKind::Vwap;
        SeriesEffect::SeriesCreated {
            id: id.into(),
            kind,
            data: line(v),
            placement: kind.placement(),
            color: None,
        }
    }

    fn updated(id: &str, v: f64) -> SeriesEffect {
        SeriesEffect::SeriesUpdated {
            id: id.into(),
            data: line(v),
        }
    }

    fn removed(id: &str) -> SeriesEffect {
        SeriesEffect::SeriesRemoved { id: id.into() }
    }

    #[test]
    fn merge_rules() {
        let mut c = EffectCoalescer::new(0);
        c.extend([created("a", 1.0), updated("a", 2.0)]);
        assert_eq!(c.flush(), vec![created("a", 2.0)]);

        c.extend([updated("a", 1.0), updated("a", 3.0)]);
        assert_eq!(c.flush(), vec![updated("a", 3.0)]);

        c.extend([created("a", 1.0), removed("a")]);
        assert!(c.flush().is_empty());

        c.extend([updated("a", 1.0), removed("a")]);
        assert_eq!(c.flush(), vec![removed("a")]);

        c.extend([removed("a"), created("a", 5.0), updated("a", 6.0)]);
        assert_eq!(c.flush(), vec![removed("a"), created("a", 6.0)]);
    }

    #[test]
    fn removals_released_first() {
        let mut c = EffectCoalescer::new(0);
        c.extend([updated("a", 1.0), created("b", 1.0), removed("c")]);
        assert_eq!(c.flush(), vec![removed("c"), updated("a", 1.0), created("b", 1.0)]);
    }

    #[test]
    fn throttles_by_window() {
        let mut c = EffectCoalescer::new(100);
        c.push(updated("a", 1.0));
        assert_eq!(c.poll(1_000), Some(vec![updated("a", 1.0)]));

        c.push(updated("a", 2.0));
        assert_eq!(c.poll(1_050), None);
        c.push(updated("a", 3.0));
        assert_eq!(c.pending_len(), 1);
        assert_eq!(c.poll(1_100), Some(vec![updated("a", 3.0)]));
        assert_eq!(c.poll(1_300), None);
    }
}
