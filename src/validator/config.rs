use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::RoundingMap;
use crate::comparator::{DEFAULT_ABS_TOLERANCE, DEFAULT_MAX_REPORTED_DIFFS, DEFAULT_REL_TOLERANCE, TolerantComparator};
use crate::engine::{ExecutionOptions, RetryPolicy};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrderPolicy {
    /// A pure row-order difference is reported but does not fail the run.
    #[default]
    Informational,
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub retry: RetryConfig,
    pub row_order_policy: RowOrderPolicy,
    pub parallel: bool,
    pub bypass_cache: bool,
    pub execution_timeout_ms: Option<u64>,
    pub default_aggregate_precision: i32,
    pub float_abs_tolerance: f64,
    pub float_rel_tolerance: f64,
    pub max_reported_diffs: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            row_order_policy: RowOrderPolicy::default(),
            parallel: true,
            bypass_cache: false,
            execution_timeout_ms: None,
            default_aggregate_precision: 2,
            float_abs_tolerance: DEFAULT_ABS_TOLERANCE,
            float_rel_tolerance: DEFAULT_REL_TOLERANCE,
            max_reported_diffs: DEFAULT_MAX_REPORTED_DIFFS,
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row-order differences fail the run.
    pub fn strict() -> Self {
        Self {
            row_order_policy: RowOrderPolicy::Strict,
            ..Self::default()
        }
    }

    /// Executions run one after another instead of concurrently.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_bypass_cache(mut self, bypass_cache: bool) -> Self {
        self.bypass_cache = bypass_cache;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.execution_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry.max_retries)
    }

    pub fn execution_options(&self) -> ExecutionOptions {
        let options = ExecutionOptions::new().with_bypass_cache(self.bypass_cache);
        match self.execution_timeout_ms {
            Some(ms) => options.with_timeout(Duration::from_millis(ms)),
            None => options,
        }
    }

    pub fn comparator(&self, rounding: RoundingMap) -> TolerantComparator {
        TolerantComparator::new(rounding)
            .with_tolerances(self.float_abs_tolerance, self.float_rel_tolerance)
            .with_max_reported_diffs(self.max_reported_diffs)
    }
}
