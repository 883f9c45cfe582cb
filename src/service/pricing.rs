use crate::models::{PriceSource, QuoteRecord};
use crate::service::aggregator::round4;
use crate::service::similarity::decimal_to_f64;

/// 成交价比单纯报价更可信，置信度加成
pub const FINAL_PRICE_BONUS: f64 = 0.1;

/// 价格建议
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSuggestion {
    pub suggested_price: Option<f64>,
    pub price_confidence: f64,
}

impl PriceSuggestion {
    pub fn none() -> Self {
        Self {
            suggested_price: None,
            price_confidence: 0.0,
        }
    }
}

/// 根据一条历史记录及其相似度给出建议价和置信度
pub fn suggest_price(candidate: &QuoteRecord, similarity_score: f64) -> PriceSuggestion {
    // 先换算再挑选：成交价无法表示为有限 f64 时退回初始报价
    let final_price = candidate
        .final_agreed_price
        .as_ref()
        .and_then(decimal_to_f64)
        .map(|p| (p, PriceSource::FinalAgreed));
    let Some((price, source)) = final_price.or_else(|| {
        candidate
            .initial_quote_amount
            .as_ref()
            .and_then(decimal_to_f64)
            .map(|p| (p, PriceSource::InitialQuote))
    }) else {
        return PriceSuggestion::none();
    };

    let bonus = match source {
        PriceSource::FinalAgreed => FINAL_PRICE_BONUS,
        PriceSource::InitialQuote => 0.0,
    };

    PriceSuggestion {
        suggested_price: Some(price),
        price_confidence: round4((similarity_score + bonus).min(1.0)),
    }
}
