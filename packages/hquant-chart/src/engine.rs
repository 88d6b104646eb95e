use crate::config::{EngineConfig, IndicatorConfigSet, IndicatorId, RawIndicatorConfig};
use crate::error::Result;
use crate::indicator::SeriesData;
use crate::manager::IndicatorSeriesManager;
use crate::period::Period;
use crate::protocol::{HostCommand, SeriesEffect};
use crate::streaming::StreamingUpdateHandler;
use crate::Bar;
use tracing::debug;

/// Chart core: base/display series + realized indicator series.
///
/// Every mutating call returns the effects the host must apply. Calls must
/// be serialized by the caller.
#[derive(Debug)]
pub struct ChartEngine {
    config: EngineConfig,
    stream: StreamingUpdateHandler,
    manager: IndicatorSeriesManager,
}

impl Default for ChartEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ChartEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            stream: StreamingUpdateHandler::with_max_bars(config.bar_cap()),
            manager: IndicatorSeriesManager::new(config.recompute),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bars the indicators are computed from (aggregated when an interval is set).
    pub fn bars(&self) -> &[Bar] {
        self.stream.display()
    }

    pub fn base_bars(&self) -> &[Bar] {
        self.stream.base()
    }

    pub fn interval(&self) -> Option<Period> {
        self.stream.interval()
    }

    pub fn indicators(&self) -> &IndicatorConfigSet {
        self.manager.config()
    }

    pub fn series(&self, id: &IndicatorId) -> Option<SeriesData> {
        self.manager.series(id)
    }

    pub fn load_base_series(&mut self, points: Vec<Bar>) -> Result<Vec<SeriesEffect>> {
        let change = self.stream.load(points)?;
        Ok(self.manager.apply_change(change, self.stream.display()))
    }

    pub fn apply_tick(&mut self, point: Bar) -> Result<Vec<SeriesEffect>> {
        let change = self.stream.apply_tick(point)?;
        Ok(self.manager.apply_change(change, self.stream.display()))
    }

    pub fn set_indicator_config(&mut self, config: IndicatorConfigSet) -> Vec<SeriesEffect> {
        self.manager.reconcile(config, self.stream.display())
    }

    /// Validates host entries; malformed ones behave as disabled.
    pub fn set_indicator_config_raw(&mut self, raw: Vec<RawIndicatorConfig>) -> Vec<SeriesEffect> {
        self.set_indicator_config(IndicatorConfigSet::from_raw(raw))
    }

    pub fn set_aggregation_interval(&mut self, seconds: i64) -> Result<Vec<SeriesEffect>> {
        let change = self.stream.set_interval(seconds)?;
        Ok(self.manager.apply_change(change, self.stream.display()))
    }

    pub fn clear_aggregation_interval(&mut self) -> Vec<SeriesEffect> {
        let change = self.stream.clear_interval();
        self.manager.apply_change(change, self.stream.display())
    }

    pub fn dispatch(&mut self, cmd: HostCommand) -> Result<Vec<SeriesEffect>> {
        match cmd {
            HostCommand::LoadBaseSeries { points } => self.load_base_series(points),
            HostCommand::ApplyTick { point } => self.apply_tick(point),
            HostCommand::SetIndicatorConfig { indicators } => Ok(self.set_indicator_config_raw(indicators)),
            HostCommand::SetAggregationInterval { seconds } => {
                let seconds = seconds.to_secs()?;
                self.set_aggregation_interval(seconds)
            }
            HostCommand::ClearAggregationInterval => Ok(self.clear_aggregation_interval()),
        }
    }

    /// JSON in, JSON array of effects out.
    pub fn dispatch_json(&mut self, json: &str) -> Result<String> {
        let cmd: HostCommand = serde_json::from_str(json)?;
        let effects = self.dispatch(cmd)?;
        debug!(effects = effects.len(), "command dispatched");
        Ok(serde_json::to_string(&effects)?)
    }
}
