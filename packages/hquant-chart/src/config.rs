//! Indicator configuration (typed and wire forms) and engine options.

use crate::error::ConfigError;
use crate::indicator::{IndicatorKind, KindTag};
use core::fmt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{trace, warn};

/// Stable, host-chosen identifier of one indicator series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorId(String);

impl IndicatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IndicatorId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for IndicatorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_enabled() -> bool {
    true
}

/// Wire form of an indicator entry, as the host sends it.
///
/// ```json
/// { "id": "rsi-1", "kind": "rsi", "parameters": { "period": 14 }, "enabled": true, "color": "#f0a" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIndicatorConfig {
    pub id: IndicatorId,
    pub kind: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub color: Option<String>,
}

/// Validated indicator entry. Missing parameters already carry their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub id: IndicatorId,
    pub kind: IndicatorKind,
    pub enabled: bool,
    pub color: Option<String>,
}

impl IndicatorConfig {
    pub fn new(id: impl Into<IndicatorId>, kind: IndicatorKind) -> Self {
        Self {
            id: id.into(),
            kind,
            enabled: true,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl TryFrom<RawIndicatorConfig> for IndicatorConfig {
    type Error = ConfigError;

    fn try_from(raw: RawIndicatorConfig) -> Result<Self, Self::Error> {
        let tag = KindTag::parse(&raw.kind).ok_or_else(|| ConfigError::UnknownKind(raw.kind.clone()))?;
        let params = Params(&raw.parameters);
        let kind = match IndicatorKind::defaults(tag) {
            IndicatorKind::Sma { period } => IndicatorKind::Sma {
                period: params.period(&["period"], period)?,
            },
            IndicatorKind::Ema { period } => IndicatorKind::Ema {
                period: params.period(&["period"], period)?,
            },
            IndicatorKind::Vwap => IndicatorKind::Vwap,
            IndicatorKind::Rsi { period } => IndicatorKind::Rsi {
                period: params.period(&["period"], period)?,
            },
            IndicatorKind::Macd { fast, slow, signal } => IndicatorKind::Macd {
                fast: params.period(&["fastPeriod", "fast"], fast)?,
                slow: params.period(&["slowPeriod", "slow"], slow)?,
                signal: params.period(&["signalPeriod", "signal"], signal)?,
            },
            IndicatorKind::BollingerBands { period, multiplier } => IndicatorKind::BollingerBands {
                period: params.period(&["period"], period)?,
                multiplier: params.number(&["stdDevMultiplier", "multiplier"], multiplier)?,
            },
        };
        if kind.min_len().is_none() {
            warn!(id = %raw.id, %kind, "indicator parameters out of range, series will stay empty");
        }
        Ok(Self {
            id: raw.id,
            kind,
            enabled: raw.enabled,
            color: raw.color,
        })
    }
}

struct Params<'a>(&'a Map<String, Value>);

impl Params<'_> {
    /// First present, non-null key among `names`.
    fn lookup(&self, names: &[&'static str]) -> Option<(&'static str, &Value)> {
        names
            .iter()
            .find_map(|&name| self.0.get(name).filter(|v| !v.is_null()).map(|v| (name, v)))
    }

    /// Whole-number period. Values `<= 0` map to `0`, which no indicator can satisfy.
    fn period(&self, names: &[&'static str], default: usize) -> Result<usize, ConfigError> {
        let Some((name, value)) = self.lookup(names) else {
            return Ok(default);
        };
        let invalid = |reason: &str| ConfigError::InvalidParameter {
            name: name.to_owned(),
            reason: reason.to_owned(),
        };
        let n = value.as_f64().ok_or_else(|| invalid("expected a number"))?;
        if !n.is_finite() || n.fract() != 0.0 {
            return Err(invalid("expected a whole number"));
        }
        if n <= 0.0 {
            trace!(name, value = n, "non-positive period");
            return Ok(0);
        }
        if n > u32::MAX as f64 {
            return Err(invalid("period too large"));
        }
        Ok(n as usize)
    }

    fn number(&self, names: &[&'static str], default: f64) -> Result<f64, ConfigError> {
        let Some((name, value)) = self.lookup(names) else {
            return Ok(default);
        };
        value
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| ConfigError::InvalidParameter {
                name: name.to_owned(),
                reason: "expected a finite number".to_owned(),
            })
    }
}

/// Indicator entries keyed by id, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorConfigSet {
    entries: Vec<IndicatorConfig>,
}

impl IndicatorConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates host entries. Malformed entries are logged and left out, so
    /// they behave as disabled; a repeated id replaces the earlier entry.
    pub fn from_raw(raw: impl IntoIterator<Item = RawIndicatorConfig>) -> Self {
        let mut set = Self::new();
        for entry in raw {
            let id = entry.id.clone();
            match IndicatorConfig::try_from(entry) {
                Ok(cfg) => {
                    set.insert(cfg);
                }
                Err(error) => warn!(%id, %error, "malformed indicator config treated as disabled"),
            }
        }
        set
    }

    /// Inserts `cfg`, replacing an entry with the same id in place.
    pub fn insert(&mut self, cfg: IndicatorConfig) -> Option<IndicatorConfig> {
        match self.entries.iter_mut().find(|e| e.id == cfg.id) {
            Some(slot) => {
                let error = ConfigError::DuplicateId(cfg.id.to_string());
                warn!(%error, "later entry wins");
                Some(std::mem::replace(slot, cfg))
            }
            None => {
                self.entries.push(cfg);
                None
            }
        }
    }

    pub fn remove(&mut self, id: &IndicatorId) -> Option<IndicatorConfig> {
        let pos = self.entries.iter().position(|e| &e.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, id: &IndicatorId) -> Option<&IndicatorConfig> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorConfig> {
        self.entries.iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &IndicatorConfig> {
        self.entries.iter().filter(|e| e.enabled)
    }
}

impl FromIterator<IndicatorConfig> for IndicatorConfigSet {
    fn from_iter<I: IntoIterator<Item = IndicatorConfig>>(iter: I) -> Self {
        let mut set = Self::new();
        for cfg in iter {
            set.insert(cfg);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecomputeMode {
    /// Extend or revise executor state on appends and last-bar revisions.
    #[default]
    Incremental,
    /// Recompute every series from scratch on every change.
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub recompute: RecomputeMode,
    /// Oldest bars beyond this count are dropped from the base series.
    pub max_bars: Option<usize>,
}

impl EngineConfig {
    pub fn from_json(s: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub(crate) fn bar_cap(&self) -> Option<usize> {
        self.max_bars.filter(|&n| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawIndicatorConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn defaults_fill_missing_parameters() {
        let cfg = IndicatorConfig::try_from(raw(json!({"id": "m", "kind": "MACD"}))).unwrap();
        assert_eq!(
            cfg.kind,
            IndicatorKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
        );
        assert!(cfg.enabled);
        assert_eq!(cfg.color, None);
    }

    #[test]
    fn explicit_parameters() {
        let cfg = IndicatorConfig::try_from(raw(json!({
            "id": "bb",
            "kind": "bollingerBands",
            "parameters": {"period": 10, "stdDevMultiplier": 1.5},
            "enabled": false,
            "color": "#00f"
        })))
        .unwrap();
        assert_eq!(
            cfg.kind,
            IndicatorKind::BollingerBands {
                period: 10,
                multiplier: 1.5
            }
        );
        assert!(!cfg.enabled);
        assert_eq!(cfg.color.as_deref(), Some("#00f"));

        let cfg = IndicatorConfig::try_from(raw(json!({
            "id": "m",
            "kind": "macd",
            "parameters": {"fastPeriod": 5, "slowPeriod": 35.0, "signalPeriod": 5}
        })))
        .unwrap();
        assert_eq!(
            cfg.kind,
            IndicatorKind::Macd {
                fast: 5,
                slow: 35,
                signal: 5
            }
        );
    }

    #[test]
    fn non_positive_period_is_kept_as_empty_indicator() {
        let cfg =
            IndicatorConfig::try_from(raw(json!({"id": "s", "kind": "sma", "parameters": {"period": -3}})))
                .unwrap();
        assert_eq!(cfg.kind, IndicatorKind::Sma { period: 0 });
        assert_eq!(cfg.kind.min_len(), None);
    }

    #[test]
    fn malformed_entries() {
        let err = IndicatorConfig::try_from(raw(json!({"id": "x", "kind": "stoch"}))).unwrap_err();
        assert_eq!(err, ConfigError::UnknownKind("stoch".into()));

        let err = IndicatorConfig::try_from(raw(
            json!({"id": "x", "kind": "ema", "parameters": {"period": 2.5}}),
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { ref name, .. } if name == "period"));

        let err = IndicatorConfig::try_from(raw(
            json!({"id": "x", "kind": "rsi", "parameters": {"period": "14"}}),
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { .. }));
    }

    #[test]
    fn set_skips_malformed_and_replaces_duplicates() {
        let set = IndicatorConfigSet::from_raw(vec![
            raw(json!({"id": "a", "kind": "sma", "parameters": {"period": 5}})),
            raw(json!({"id": "bad", "kind": "nope"})),
            raw(json!({"id": "b", "kind": "rsi"})),
            raw(json!({"id": "a", "kind": "ema", "parameters": {"period": 7}})),
        ]);
        let ids: Vec<&str> = set.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(set.get(&"a".into()).unwrap().kind, IndicatorKind::Ema { period: 7 });
    }

    #[test]
    fn enabled_filter_and_remove() {
        let mut set: IndicatorConfigSet = [
            IndicatorConfig::new("a", IndicatorKind::Vwap),
            IndicatorConfig::new("b", IndicatorKind::Vwap).disabled(),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.enabled().count(), 1);
        assert!(set.remove(&"a".into()).is_some());
        assert!(set.remove(&"a".into()).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn engine_config_from_json() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
        let cfg = EngineConfig::from_json(r#"{"recompute":"full","maxBars":500}"#).unwrap();
        assert_eq!(cfg.recompute, RecomputeMode::Full);
        assert_eq!(cfg.bar_cap(), Some(500));
        let cfg = EngineConfig::from_json(r#"{"maxBars":0}"#).unwrap();
        assert_eq!(cfg.bar_cap(), None);
    }
}
