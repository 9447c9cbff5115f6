pub mod normalized_cell;
pub use normalized_cell::*;

pub mod normalized_result_set;
pub use normalized_result_set::*;

pub mod result_normalizer;
pub use result_normalizer::*;
