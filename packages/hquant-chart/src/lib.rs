//! Technical-indicator computation and live-series reconciliation for price charts.
//!
//! Bars flow in through [`ChartEngine`] (full loads, ticks, aggregation
//! switches); indicator series flow out as [`SeriesEffect`]s the host applies
//! to its chart widget.

mod types;
pub use types::*;

pub mod circular;
pub mod period;
pub mod aggregator;

pub mod indicator;

pub mod config;
pub mod error;
pub mod series;
pub mod streaming;
pub mod manager;
pub mod protocol;
pub mod coalesce;

pub mod engine;

pub use config::{EngineConfig, IndicatorConfig, IndicatorConfigSet, IndicatorId, RecomputeMode};
pub use engine::ChartEngine;
pub use error::{ConfigError, EngineError, Result};
pub use protocol::{HostCommand, SeriesEffect};
