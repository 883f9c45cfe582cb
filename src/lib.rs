pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::create_pool;
pub use error::MatchError;
pub use models::{MatchResult, QuoteRecord};
pub use service::{find_matches, MatchOptions, QuoteMatchService, QuoteMatcher};
