use once_cell::sync::Lazy;
use regex::Regex;

/// Faults an engine can raise while running one query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A table, view or schema the query names could not be resolved.
    #[error("unresolved object: {0}")]
    UnresolvedObject(String),

    #[error("execution failed: {0}")]
    Execution(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// Disabling the result cache failed. Never fatal on its own.
    #[error("result cache control failed: {0}")]
    CacheControl(String),

    #[error("execution stats unavailable: {0}")]
    StatsUnavailable(String),
}

impl EngineError {
    /// Classifies an untyped driver message.
    pub fn from_message(message: impl Into<String>) -> Self {
        static UNRESOLVED: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"(?i)table_or_view_not_found|\bdoes not exist\b|\bnot found\b|\bunknown table\b|\bno such table\b|\bcannot resolve\b",
            )
            .unwrap()
        });

        let message = message.into();
        if UNRESOLVED.is_match(&message) {
            Self::UnresolvedObject(message)
        } else {
            Self::Execution(message)
        }
    }

    pub fn is_unresolved_object(&self) -> bool {
        matches!(self, Self::UnresolvedObject(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<String> for EngineError {
    fn from(message: String) -> Self {
        Self::from_message(message)
    }
}

impl From<&str> for EngineError {
    fn from(message: &str) -> Self {
        Self::from_message(message)
    }
}
