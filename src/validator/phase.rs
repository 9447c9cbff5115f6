use std::fmt;

use serde::Serialize;

/// Stages of one validation run, in execution order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPhase {
    #[default]
    Prepare = 0,
    ExecuteOriginal = 1,
    ExecuteOptimized = 2,
    Normalize = 3,
    Compare = 4,
    Report = 5,
}

impl fmt::Display for ValidationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prepare => "prepare",
            Self::ExecuteOriginal => "execute_original",
            Self::ExecuteOptimized => "execute_optimized",
            Self::Normalize => "normalize",
            Self::Compare => "compare",
            Self::Report => "report",
        };
        f.pad(name)
    }
}
