pub mod clause_profile;
pub use clause_profile::*;

pub mod rounding_map;
pub use rounding_map::*;
