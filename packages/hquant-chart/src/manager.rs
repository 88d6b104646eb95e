//! Realized indicator series keyed by id, reconciled against a declarative
//! configuration set.

use crate::config::{IndicatorConfig, IndicatorConfigSet, IndicatorId, RecomputeMode};
use crate::indicator::{Exec, IndicatorKind, SeriesData};
use crate::protocol::SeriesEffect;
use crate::series::SeriesChange;
use crate::Bar;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// One realized series plus the executor state needed to extend it.
#[derive(Debug, Clone)]
struct RealizedIndicator {
    kind: IndicatorKind,
    color: Option<String>,
    /// Everything the executor emitted, including a partial MACD line.
    raw: SeriesData,
    exec: Exec,
    /// State before the last consumed bar, for revising it.
    prev: Option<Exec>,
    last_time: Option<i64>,
    len: usize,
}

impl RealizedIndicator {
    fn compute(kind: IndicatorKind, color: Option<String>, bars: &[Bar]) -> Self {
        let mut this = Self {
            kind,
            color,
            raw: SeriesData::empty_for(&kind),
            exec: kind.exec(),
            prev: None,
            last_time: None,
            len: 0,
        };
        if let Some((last, head)) = bars.split_last() {
            for bar in head {
                this.step(bar);
            }
            this.prev = Some(this.exec.clone());
            this.step(last);
        }
        this
    }

    #[inline]
    fn step(&mut self, bar: &Bar) {
        let step = self.exec.push(bar);
        self.raw.record(bar.time, step);
        self.last_time = Some(bar.time);
        self.len += 1;
    }

    /// `bars` must be the consumed bars plus one newer bar.
    fn try_append(&mut self, bars: &[Bar]) -> bool {
        let Some(last) = bars.last() else {
            return false;
        };
        if self.len + 1 != bars.len() || self.last_time.is_some_and(|t| t >= last.time) {
            return false;
        }
        self.prev = Some(self.exec.clone());
        self.step(last);
        true
    }

    /// `bars` must be the consumed bars with only the last one changed.
    fn try_revise_last(&mut self, bars: &[Bar]) -> bool {
        let Some(last) = bars.last() else {
            return false;
        };
        if self.len != bars.len() || self.last_time != Some(last.time) {
            return false;
        }
        let Some(prev) = self.prev.clone() else {
            return false;
        };
        self.exec = prev;
        self.raw.truncate_from(last.time);
        self.len -= 1;
        self.step(last);
        true
    }

    fn is_computable(&self) -> bool {
        self.kind.is_computable(self.len)
    }

    /// Published data: empty until the minimum length is reached.
    fn data(&self) -> SeriesData {
        if self.is_computable() {
            self.raw.clone()
        } else {
            SeriesData::empty_for(&self.kind)
        }
    }

    /// Same family and color: the host can keep its series and take an update.
    fn is_equivalent(&self, cfg: &IndicatorConfig) -> bool {
        self.kind.tag() == cfg.kind.tag() && self.color == cfg.color
    }
}

#[derive(Debug, Default)]
pub struct IndicatorSeriesManager {
    config: IndicatorConfigSet,
    realized: BTreeMap<IndicatorId, RealizedIndicator>,
    mode: RecomputeMode,
}

impl IndicatorSeriesManager {
    pub fn new(mode: RecomputeMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &IndicatorConfigSet {
        &self.config
    }

    pub fn mode(&self) -> RecomputeMode {
        self.mode
    }

    /// Realized ids in id order.
    pub fn realized_ids(&self) -> impl Iterator<Item = &IndicatorId> {
        self.realized.keys()
    }

    /// Current published data of a realized series.
    pub fn series(&self, id: &IndicatorId) -> Option<SeriesData> {
        self.realized.get(id).map(RealizedIndicator::data)
    }

    /// Makes the realized set match the enabled entries of `config` computed
    /// over `bars`.
    ///
    /// Removals come first, in id order. Creations and updates follow in
    /// configuration order. An entry whose kind family or color changed is
    /// removed and created again; any other existing entry is updated. With
    /// empty `bars` nothing is computed and every realized series is removed.
    pub fn reconcile(&mut self, config: IndicatorConfigSet, bars: &[Bar]) -> Vec<SeriesEffect> {
        let stale: Vec<IndicatorId> = self
            .realized
            .iter()
            .filter(|(id, realized)| match config.get(id) {
                Some(cfg) if cfg.enabled && !bars.is_empty() => !realized.is_equivalent(cfg),
                _ => true,
            })
            .map(|(id, _)| id.clone())
            .collect();

        let mut effects = Vec::with_capacity(stale.len() + config.len());
        for id in stale {
            self.realized.remove(&id);
            effects.push(SeriesEffect::SeriesRemoved { id });
        }
        let removed = effects.len();

        if !bars.is_empty() {
            for cfg in config.enabled() {
                let realized = RealizedIndicator::compute(cfg.kind, cfg.color.clone(), bars);
                let data = realized.data();
                let effect = if self.realized.contains_key(&cfg.id) {
                    SeriesEffect::SeriesUpdated {
                        id: cfg.id.clone(),
                        data,
                    }
                } else {
                    SeriesEffect::SeriesCreated {
                        id: cfg.id.clone(),
                        kind: cfg.kind,
                        data,
                        placement: cfg.kind.placement(),
                        color: cfg.color.clone(),
                    }
                };
                self.realized.insert(cfg.id.clone(), realized);
                effects.push(effect);
            }
        }
        self.config = config;

        let created = effects
            .iter()
            .filter(|e| matches!(e, SeriesEffect::SeriesCreated { .. }))
            .count();
        debug!(
            bars = bars.len(),
            removed,
            created,
            updated = effects.len() - removed - created,
            "reconciled indicator series"
        );
        effects
    }

    /// Reconciles the current configuration against `bars`.
    pub fn recompute_all(&mut self, bars: &[Bar]) -> Vec<SeriesEffect> {
        let config = std::mem::take(&mut self.config);
        self.reconcile(config, bars)
    }

    /// Brings every realized series in line with `bars` after a mutation
    /// classified as `change`.
    ///
    /// Appends and last-bar revisions extend executor state in
    /// [`RecomputeMode::Incremental`]; the result is identical to a full
    /// recompute. Only series at or past their minimum length emit updates.
    pub fn apply_change(&mut self, change: SeriesChange, bars: &[Bar]) -> Vec<SeriesEffect> {
        match change {
            SeriesChange::Unchanged => Vec::new(),
            SeriesChange::Replace => self.recompute_all(bars),
            SeriesChange::Append | SeriesChange::ReviseLast => {
                if bars.is_empty() || self.realized.len() != self.config.enabled().count() {
                    return self.recompute_all(bars);
                }
                let mut effects = Vec::with_capacity(self.realized.len());
                let mut rebuilt = 0usize;
                for cfg in self.config.enabled() {
                    let Some(realized) = self.realized.get_mut(&cfg.id) else {
                        continue;
                    };
                    let extended = self.mode == RecomputeMode::Incremental
                        && match change {
                            SeriesChange::Append => realized.try_append(bars),
                            _ => realized.try_revise_last(bars),
                        };
                    if !extended {
                        *realized = RealizedIndicator::compute(realized.kind, realized.color.take(), bars);
                        rebuilt += 1;
                    }
                    if realized.is_computable() {
                        effects.push(SeriesEffect::SeriesUpdated {
                            id: cfg.id.clone(),
                            data: realized.data(),
                        });
                    }
                }
                trace!(?change, updated = effects.len(), rebuilt, "series advanced");
                effects
            }
        }
    }
}
