use crate::service::{MatchOptions, WeightTable};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 匹配参数配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub min_score: f64,
    pub max_matches: usize,
    pub candidate_limit: i64,                    // 每次取候选池的上限
    pub weights: Option<HashMap<String, f64>>,   // 不配置则用默认权重表
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_score: 0.5,
            max_matches: 10,
            candidate_limit: 500,
            weights: None,
        }
    }
}

impl MatchingConfig {
    pub fn to_options(&self) -> MatchOptions {
        MatchOptions {
            min_score: self.min_score,
            max_matches: self.max_matches,
            weights: self
                .weights
                .clone()
                .map(WeightTable::from)
                .unwrap_or_default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/freight_quotes".to_string(),
                max_connections: 20,
            },
            matching: MatchingConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置：默认值 < quote-matcher.{toml,yaml,json} < QUOTE_MATCHER__* 环境变量
    /// DATABASE_URL / SERVER_HOST / SERVER_PORT 作为简写优先级最高
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("quote-matcher").required(false))
            .add_source(
                Environment::with_prefix("QUOTE_MATCHER")
                    .prefix_separator("__")
                    .separator("__"),
            );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        builder.build()?.try_deserialize()
    }
}
