use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::engine::{EngineConnection, EngineError, ExecutionMetrics, ResultSet, RetryPolicy};
use crate::rewriter::TableQualifier;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionOptions {
    pub bypass_cache: bool,
    pub timeout: Option<Duration>,
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bypass_cache(mut self, bypass_cache: bool) -> Self {
        self.bypass_cache = bypass_cache;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Outcome of one (possibly retried) execution. A fault never escapes:
/// it lands in `fault` with an empty result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimedExecution {
    pub result_set: ResultSet,
    pub metrics: ExecutionMetrics,
    pub fault: Option<EngineError>,
    /// Text of the last attempt, after any retry rewrite.
    pub query: String,
    pub retry_notes: Vec<String>,
}

impl TimedExecution {
    pub fn is_ok(&self) -> bool {
        self.fault.is_none()
    }
}

pub struct TimedExecutor;

impl TimedExecutor {
    pub async fn execute_timed<E: EngineConnection>(
        connection: &E,
        query: &str,
        options: &ExecutionOptions,
    ) -> TimedExecution {
        let mut sent = query.to_string();
        if options.bypass_cache {
            if let Err(err) = connection.disable_result_cache().await {
                debug!(engine = connection.name(), error = %err, "result cache left enabled");
            }
            sent = connection.apply_cache_bypass(&sent);
        }

        let started = Instant::now();
        let outcome = match options.timeout {
            Some(limit) => match tokio::time::timeout(limit, connection.execute(&sent)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(EngineError::Timeout(limit.as_millis() as u64)),
            },
            None => connection.execute(&sent).await,
        };
        let wall_clock_ms = started.elapsed().as_secs_f64() * 1000.0;

        let output = match outcome {
            Ok(output) => output,
            Err(err) => {
                debug!(engine = connection.name(), error = %err, wall_clock_ms, "execution failed");
                return TimedExecution {
                    result_set: ResultSet::empty(),
                    metrics: ExecutionMetrics::failed(wall_clock_ms, err.to_string()),
                    fault: Some(err),
                    query: query.to_string(),
                    retry_notes: Vec::new(),
                };
            }
        };

        let rows = output.result_set.row_count() as u64;
        let metrics = match output.execution_id.as_deref() {
            Some(id) => match connection.lookup_stats(id).await {
                Ok(Some(stats)) => ExecutionMetrics::engine(stats.execution_time_ms, wall_clock_ms, stats.rows_produced),
                Ok(None) => ExecutionMetrics::wall_clock(wall_clock_ms, rows),
                Err(err) => {
                    debug!(engine = connection.name(), execution_id = id, error = %err, "falling back to wall clock");
                    ExecutionMetrics::wall_clock(wall_clock_ms, rows)
                }
            },
            None => ExecutionMetrics::wall_clock(wall_clock_ms, rows),
        };

        TimedExecution {
            result_set: output.result_set,
            metrics,
            fault: None,
            query: query.to_string(),
            retry_notes: Vec::new(),
        }
    }

    /// Runs `query`, re-running it with tables qualified by `database` while
    /// the fault is recoverable under `policy`. `label` prefixes retry notes.
    pub async fn execute_with_retry<E: EngineConnection>(
        connection: &E,
        query: &str,
        database: &str,
        policy: &RetryPolicy,
        options: &ExecutionOptions,
        label: &str,
    ) -> TimedExecution {
        let mut current = query.to_string();
        let mut notes = Vec::new();
        let mut attempt = 0;

        loop {
            let mut execution = Self::execute_timed(connection, &current, options).await;
            let retry_reason = execution
                .fault
                .as_ref()
                .filter(|err| policy.should_retry(err, attempt))
                .map(ToString::to_string);
            let Some(reason) = retry_reason else {
                execution.retry_notes = notes;
                return execution;
            };

            attempt += 1;
            warn!(engine = connection.name(), label, attempt, error = %reason, "retrying with qualified tables");
            notes.push(format!(
                "{label}: retry {attempt} with tables qualified as `{database}.<table>` after: {reason}"
            ));
            current = TableQualifier::qualify(&current, database);
        }
    }
}
