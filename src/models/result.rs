use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 匹配结果 (按需计算，核心不负责持久化)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub source_quote_id: i64,
    pub matched_quote_id: i64,
    pub similarity_score: f64,
    pub breakdown: IndexMap<String, f64>,  // 属性名 -> 分项得分
    pub suggested_price: Option<f64>,
    pub price_confidence: Option<f64>,     // 仅在有建议价时存在

    // 以下为候选记录的原始字段，方便调用方展示
    pub origin_city: Option<String>,
    pub origin_state_province: Option<String>,
    pub origin_country: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state_province: Option<String>,
    pub destination_country: Option<String>,
    pub cargo_description: Option<String>,
    pub service_type: Option<String>,
    pub initial_quote_amount: Option<f64>,
    pub final_agreed_price: Option<f64>,
}

/// 单条报价的匹配统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStats {
    pub quote_id: i64,
    pub candidate_count: usize,
    pub match_count: usize,
    pub best_score: Option<f64>,
    pub suggested_price: Option<f64>,
    pub persisted: bool,
}
