pub mod parser;

pub mod analysis;
pub use analysis::{ClauseProfile, RoundingMap};

pub mod rewriter;
pub use rewriter::{HintStripper, TableQualifier};

pub mod engine;
pub use engine::{EngineConnection, EngineError, ExecutionMetrics, QueryOutput, ResultSet, RetryPolicy};

pub mod normalizer;
pub use normalizer::{NormalizedResultSet, Normalizer};

pub mod comparator;
pub use comparator::{Comparison, TolerantComparator};

pub mod validator;
pub use validator::{validate, QueryPair, ValidationReport, ValidationStatus, Validator, ValidatorConfig};
