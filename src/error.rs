use thiserror::Error;

/// 服务层错误 (匹配核心本身不会失败)
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("quote {0} not found")]
    QuoteNotFound(i64),

    #[error("persisting matches timed out after {0}s")]
    PersistTimeout(u64),

    #[error("csv export failed: {0}")]
    Export(#[from] csv::Error),
}
