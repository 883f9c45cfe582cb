pub mod lenient;
pub mod quote;
pub mod result;

pub use quote::{PriceSource, QuoteRecord};
pub use result::{MatchResult, MatchStats};
