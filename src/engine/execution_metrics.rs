use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    Engine,
    #[default]
    WallClock,
}

/// Timing and volume of one execution. `execution_time_ms` is the engine's
/// own figure when available, otherwise the wall clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub execution_time_ms: f64,
    pub wall_clock_ms: f64,
    pub rows_processed: u64,
    pub time_source: TimeSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionMetrics {
    pub fn wall_clock(wall_clock_ms: f64, rows_processed: u64) -> Self {
        Self {
            execution_time_ms: wall_clock_ms,
            wall_clock_ms,
            rows_processed,
            time_source: TimeSource::WallClock,
            error: None,
        }
    }

    pub fn engine(execution_time_ms: f64, wall_clock_ms: f64, rows_processed: u64) -> Self {
        Self {
            execution_time_ms,
            wall_clock_ms,
            rows_processed,
            time_source: TimeSource::Engine,
            error: None,
        }
    }

    pub fn failed(wall_clock_ms: f64, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::wall_clock(wall_clock_ms, 0)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
