pub mod sql_token;
pub use sql_token::*;

pub mod token_stream;
pub use token_stream::*;

pub mod query_parser;
pub use query_parser::*;

pub mod word_comparer;
pub use word_comparer::*;

pub mod query_comparers;
pub use query_comparers::*;
