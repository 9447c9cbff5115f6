use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, ResultSet};

/// What one `execute` call hands back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub result_set: ResultSet,
    /// Engine-side handle for a later `lookup_stats`, when the engine has one.
    pub execution_id: Option<String>,
}

impl QueryOutput {
    pub fn new(result_set: ResultSet) -> Self {
        Self { result_set, execution_id: None }
    }

    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }
}

impl From<ResultSet> for QueryOutput {
    fn from(result_set: ResultSet) -> Self {
        Self::new(result_set)
    }
}

/// Engine-reported timing for a finished execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub execution_time_ms: f64,
    pub rows_produced: u64,
}

/// A live connection to one SQL engine, owned by the caller.
///
/// Only `execute` is required. Engines without a query history, result
/// cache or cache directive keep the defaults.
pub trait EngineConnection: Send + Sync {
    /// Label used in reports and logs.
    fn name(&self) -> &str;

    fn execute(&self, query: &str) -> impl Future<Output = Result<QueryOutput, EngineError>> + Send;

    /// Server-side timing for `execution_id`; `Ok(None)` when the engine
    /// keeps no such record.
    fn lookup_stats(
        &self,
        _execution_id: &str,
    ) -> impl Future<Output = Result<Option<ExecutionStats>, EngineError>> + Send {
        async { Ok(None) }
    }

    /// Best-effort session switch that turns off result caching.
    fn disable_result_cache(&self) -> impl Future<Output = Result<(), EngineError>> + Send {
        async { Ok(()) }
    }

    /// Injects a per-query no-cache directive.
    fn apply_cache_bypass(&self, query: &str) -> String {
        query.to_string()
    }
}
