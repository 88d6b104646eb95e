use thiserror::Error;

/// Why an indicator configuration entry could not be used. The entry is
/// treated as disabled; other entries in the batch are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown indicator kind {0:?}")]
    UnknownKind(String),
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("duplicate indicator id {0:?}")]
    DuplicateId(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("tick at {time} is older than the last bar at {last}")]
    OutOfOrderTick { time: i64, last: i64 },
    #[error("bar at {time} rejected: {reason}")]
    InvalidBar { time: i64, reason: &'static str },
    #[error("series is not strictly increasing in time at index {index}")]
    UnorderedSeries { index: usize },
    #[error("aggregation interval must be positive, got {0}")]
    InvalidInterval(i64),
    #[error("cannot parse interval {input:?}: {reason}")]
    UnknownInterval { input: String, reason: &'static str },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = EngineError::OutOfOrderTick { time: 5, last: 9 };
        assert_eq!(e.to_string(), "tick at 5 is older than the last bar at 9");
        let e: EngineError = ConfigError::UnknownKind("stoch".into()).into();
        assert_eq!(e.to_string(), "config: unknown indicator kind \"stoch\"");
    }
}
