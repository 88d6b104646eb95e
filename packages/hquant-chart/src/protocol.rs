//! Messages exchanged with the chart host (JSON, camelCase, `type`-tagged).

use crate::config::{IndicatorId, RawIndicatorConfig};
use crate::error::{EngineError, Result};
use crate::indicator::{IndicatorKind, Placement, SeriesData};
use crate::period::Period;
use crate::Bar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostCommand {
    LoadBaseSeries { points: Vec<Bar> },
    ApplyTick { point: Bar },
    SetIndicatorConfig { indicators: Vec<RawIndicatorConfig> },
    SetAggregationInterval { seconds: IntervalSpec },
    ClearAggregationInterval,
}

/// Bucket width as seconds (`900`) or a period string (`"15m"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntervalSpec {
    Seconds(i64),
    Text(String),
}

impl IntervalSpec {
    pub fn to_secs(&self) -> Result<i64> {
        match self {
            Self::Seconds(secs) => Ok(*secs),
            Self::Text(text) => Period::parse(text)
                .map(|p| p.as_secs())
                .map_err(|reason| EngineError::UnknownInterval {
                    input: text.clone(),
                    reason,
                }),
        }
    }
}

impl From<i64> for IntervalSpec {
    fn from(secs: i64) -> Self {
        Self::Seconds(secs)
    }
}

/// One change to the set of realized series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SeriesEffect {
    SeriesCreated {
        id: IndicatorId,
        kind: IndicatorKind,
        data: SeriesData,
        placement: Placement,
        color: Option<String>,
    },
    SeriesUpdated {
        id: IndicatorId,
        data: SeriesData,
    },
    SeriesRemoved {
        id: IndicatorId,
    },
}

impl SeriesEffect {
    pub fn id(&self) -> &IndicatorId {
        match self {
            Self::SeriesCreated { id, .. } | Self::SeriesUpdated { id, .. } | Self::SeriesRemoved { id } => id,
        }
    }
}
