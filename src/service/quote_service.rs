use crate::db::queries;
use crate::error::MatchError;
use crate::models::{MatchResult, MatchStats};
use crate::service::matcher::QuoteMatcher;
use sqlx::PgPool;
use std::sync::Arc;

/// 报价匹配服务：从数据库取查询/候选报价，调用匹配核心，可选持久化
pub struct QuoteMatchService {
    pool: PgPool,
    matcher: Arc<QuoteMatcher>,
    candidate_limit: i64,
}

impl QuoteMatchService {
    pub fn new(pool: PgPool, matcher: Arc<QuoteMatcher>, candidate_limit: i64) -> Self {
        Self {
            pool,
            matcher,
            candidate_limit,
        }
    }

    /// 批量匹配入口：本批次的报价互相不作为候选
    pub async fn match_batch(
        &self,
        quote_ids: &[i64],
        persist: bool,
    ) -> Result<Vec<MatchStats>, MatchError> {
        let candidates =
            queries::list_candidate_quotes(&self.pool, quote_ids, self.candidate_limit).await?;
        tracing::info!(
            "Matching {} quotes against {} candidates (limit {})",
            quote_ids.len(),
            candidates.len(),
            self.candidate_limit
        );

        let mut all_stats = Vec::with_capacity(quote_ids.len());
        for &quote_id in quote_ids {
            let Some(query) = queries::get_quote(&self.pool, quote_id).await? else {
                tracing::warn!("Quote {} not found, skipping", quote_id);
                continue;
            };

            let matches = self.matcher.find_matches(&query, &candidates);
            let best = matches.first();
            let mut stats = MatchStats {
                quote_id,
                candidate_count: candidates.len(),
                match_count: matches.len(),
                best_score: best.map(|m| m.similarity_score),
                suggested_price: best.and_then(|m| m.suggested_price),
                persisted: false,
            };

            if persist && !matches.is_empty() {
                if let Err(e) = queries::insert_matches(&self.pool, &matches).await {
                    tracing::error!("Quote {} persisting matches failed: {}", quote_id, e);
                    return Err(e);
                }
                stats.persisted = true;
            }

            tracing::info!(
                "Quote {}: {} matches, best score {:?}, suggested price {:?}",
                quote_id,
                stats.match_count,
                stats.best_score,
                stats.suggested_price
            );
            all_stats.push(stats);
        }

        Ok(all_stats)
    }

    /// 计算单条报价的匹配结果，不写库
    pub async fn matches_for(&self, quote_id: i64) -> Result<Vec<MatchResult>, MatchError> {
        let query = queries::get_quote(&self.pool, quote_id)
            .await?
            .ok_or(MatchError::QuoteNotFound(quote_id))?;
        let candidates =
            queries::list_candidate_quotes(&self.pool, &[quote_id], self.candidate_limit).await?;
        Ok(self.matcher.find_matches(&query, &candidates))
    }
}
