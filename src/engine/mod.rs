pub mod engine_connection;
pub use engine_connection::*;

pub mod engine_error;
pub use engine_error::*;

pub mod execution_metrics;
pub use execution_metrics::*;

pub mod result_set;
pub use result_set::*;

pub mod retry_policy;
pub use retry_policy::*;

pub mod timed_executor;
pub use timed_executor::*;
