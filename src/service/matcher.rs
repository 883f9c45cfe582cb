use crate::models::{MatchResult, QuoteRecord};
use crate::service::aggregator::{aggregate, AttributeScores, WeightTable};
use crate::service::pricing::suggest_price;
use crate::service::similarity::decimal_to_f64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// 候选池达到该规模时改为 rayon 并行打分
pub const PARALLEL_THRESHOLD: usize = 2048;

/// 匹配参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    pub min_score: f64,
    pub max_matches: usize,
    pub weights: WeightTable,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_score: 0.5,
            max_matches: 10,
            weights: WeightTable::default(),
        }
    }
}

/// 报价匹配器：持有不可变的匹配参数，可跨线程共享
#[derive(Debug, Clone, Default)]
pub struct QuoteMatcher {
    options: MatchOptions,
}

impl QuoteMatcher {
    pub fn new(options: MatchOptions) -> Self {
        if options.weights.is_empty() {
            tracing::warn!("Weight table is empty, every candidate will score 0");
        }
        Self { options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// 在候选池中查找相似报价，按得分降序，同分保持候选池原顺序
    pub fn find_matches(&self, query: &QuoteRecord, candidates: &[QuoteRecord]) -> Vec<MatchResult> {
        let mut matches: Vec<MatchResult> = if candidates.len() >= PARALLEL_THRESHOLD {
            // 索引型并行迭代器 collect 保留输入顺序
            candidates
                .par_iter()
                .filter_map(|c| self.evaluate(query, c))
                .collect()
        } else {
            candidates
                .iter()
                .filter_map(|c| self.evaluate(query, c))
                .collect()
        };

        // sort_by 为稳定排序
        matches.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        matches.truncate(self.options.max_matches);

        tracing::debug!(
            "Quote {}: {} candidates, {} matches (min_score {})",
            query.id,
            candidates.len(),
            matches.len(),
            self.options.min_score
        );

        matches
    }

    /// 单个候选打分；自身或低于阈值返回 None
    pub fn evaluate(&self, query: &QuoteRecord, candidate: &QuoteRecord) -> Option<MatchResult> {
        if candidate.id == query.id {
            return None;
        }

        let scores = AttributeScores::compute(query, candidate);
        let aggregate = aggregate(&scores, &self.options.weights);
        if aggregate.score < self.options.min_score {
            return None;
        }

        let suggestion = suggest_price(candidate, aggregate.score);
        Some(MatchResult {
            source_quote_id: query.id,
            matched_quote_id: candidate.id,
            similarity_score: aggregate.score,
            breakdown: aggregate.breakdown,
            suggested_price: suggestion.suggested_price,
            price_confidence: suggestion
                .suggested_price
                .map(|_| suggestion.price_confidence),
            origin_city: candidate.origin_city.clone(),
            origin_state_province: candidate.origin_state_province.clone(),
            origin_country: candidate.origin_country.clone(),
            destination_city: candidate.destination_city.clone(),
            destination_state_province: candidate.destination_state_province.clone(),
            destination_country: candidate.destination_country.clone(),
            cargo_description: candidate.cargo_description.clone(),
            service_type: candidate.service_type.clone(),
            initial_quote_amount: candidate.initial_quote_amount.as_ref().and_then(decimal_to_f64),
            final_agreed_price: candidate.final_agreed_price.as_ref().and_then(decimal_to_f64),
        })
    }
}

/// 便捷入口，等价于 `QuoteMatcher::new(options.clone()).find_matches(..)`
pub fn find_matches(
    query: &QuoteRecord,
    candidates: &[QuoteRecord],
    options: &MatchOptions,
) -> Vec<MatchResult> {
    QuoteMatcher::new(options.clone()).find_matches(query, candidates)
}
