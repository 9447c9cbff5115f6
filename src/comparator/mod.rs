pub mod helpers;
pub use helpers::*;

pub mod comparison;
pub use comparison::*;

pub mod tolerant_comparator;
pub use tolerant_comparator::*;

pub mod clause_checks;
pub use clause_checks::*;
