pub mod hint_stripper;
pub use hint_stripper::*;

pub mod table_qualifier;
pub use table_qualifier::*;
