use std::fmt;
use std::sync::Arc;

use crate::engine::EngineError;

type RecoverablePredicate = Arc<dyn Fn(&EngineError) -> bool + Send + Sync>;

/// How many times a failed execution is re-run, and which faults qualify.
#[derive(Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    recoverable: RecoverablePredicate,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy").field("max_retries", &self.max_retries).finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Retries unresolved-object faults up to `max_retries` times.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            recoverable: Arc::new(EngineError::is_unresolved_object),
        }
    }

    pub fn never() -> Self {
        Self::new(0)
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&EngineError) -> bool + Send + Sync + 'static,
    {
        self.recoverable = Arc::new(predicate);
        self
    }

    pub fn is_recoverable(&self, error: &EngineError) -> bool {
        (self.recoverable)(error)
    }

    /// `attempt` counts retries already made.
    pub fn should_retry(&self, error: &EngineError, attempt: u32) -> bool {
        attempt < self.max_retries && self.is_recoverable(error)
    }
}
