pub mod aggregator;
pub mod matcher;
pub mod pricing;
pub mod quote_service;
pub mod similarity;

pub use aggregator::{Attribute, WeightTable};
pub use matcher::{find_matches, MatchOptions, QuoteMatcher};
pub use pricing::{suggest_price, PriceSuggestion};
pub use quote_service::QuoteMatchService;
