use crate::db::queries;
use crate::error::MatchError;
use crate::models::{MatchResult, MatchStats, QuoteRecord};
use crate::service::{MatchOptions, QuoteMatchService, QuoteMatcher};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_persist() -> bool {
    true
}

/// 请求体: 报价ID列表
#[derive(Debug, Deserialize)]
pub struct BatchMatchRequest {
    pub quote_ids: Vec<i64>,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

/// 批量匹配响应体（含统计信息）
#[derive(Debug, Serialize)]
pub struct BatchMatchResponse {
    pub success: bool,
    pub message: String,
    pub stats: Option<Vec<MatchStats>>,
}

/// 直接传入查询与候选记录，不访问数据库
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub query: QuoteRecord,
    pub candidates: Vec<QuoteRecord>,
    pub options: Option<MatchOptions>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub quote_id: i64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

fn error_response(e: &MatchError) -> Response {
    let status = match e {
        MatchError::QuoteNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ErrorResponse {
        success: false,
        message: format!("Error: {}", e),
    };
    (status, Json(body)).into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 批量匹配接口
pub async fn batch_match(
    State(service): State<Arc<QuoteMatchService>>,
    Json(req): Json<BatchMatchRequest>,
) -> Response {
    match service.match_batch(&req.quote_ids, req.persist).await {
        Ok(stats) => {
            let total_matches: usize = stats.iter().map(|s| s.match_count).sum();
            let priced = stats.iter().filter(|s| s.suggested_price.is_some()).count();

            let response = BatchMatchResponse {
                success: true,
                message: format!(
                    "Matched {} quotes, {} matches, {} with suggested price",
                    stats.len(),
                    total_matches,
                    priced
                ),
                stats: Some(stats),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = BatchMatchResponse {
                success: false,
                message: format!("Error: {}", e),
                stats: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// 内联匹配接口：请求里没给 options 时使用服务配置
pub async fn evaluate(
    State(matcher): State<Arc<QuoteMatcher>>,
    Json(req): Json<EvaluateRequest>,
) -> Json<EvaluateResponse> {
    let matches = match req.options {
        Some(options) => QuoteMatcher::new(options).find_matches(&req.query, &req.candidates),
        None => matcher.find_matches(&req.query, &req.candidates),
    };
    Json(EvaluateResponse { matches })
}

/// 导出单条报价的匹配结果为 CSV
pub async fn export_matches(
    State(service): State<Arc<QuoteMatchService>>,
    Json(req): Json<ExportRequest>,
) -> Response {
    let matches = match service.matches_for(req.quote_id).await {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };

    let mut buf = Vec::new();
    if let Err(e) = queries::write_csv(&matches, &mut buf) {
        return error_response(&e);
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        buf,
    )
        .into_response()
}
