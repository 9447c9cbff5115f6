pub mod config;
pub use config::*;

pub mod phase;
pub use phase::*;

pub mod performance_table;
pub use performance_table::*;

pub mod validation_report;
pub use validation_report::*;

pub mod orchestrator;
pub use orchestrator::*;
