use crate::error::MatchError;
use crate::models::{MatchResult, QuoteRecord};
use bigdecimal::{BigDecimal, FromPrimitive};
use chrono::Utc;
use sqlx::PgPool;
use std::io::Write;
use std::time::{Duration, Instant};

/// 匹配算法版本号，写入 quote_matches 便于 A/B 对比
pub const ALGORITHM_VERSION: &str = "v1-weighted";

const PERSIST_TIMEOUT_SECS: u64 = 30;

const QUOTE_COLUMNS: &str = r#"
    id,
    origin_city, origin_state_province, origin_country,
    destination_city, destination_state_province, destination_country,
    cargo_description, cargo_weight, weight_unit,
    cargo_length, cargo_width, cargo_height,
    piece_count, is_hazmat, service_type,
    initial_quote_amount, final_agreed_price
"#;

/// 查询单条报价
pub async fn get_quote(pool: &PgPool, quote_id: i64) -> Result<Option<QuoteRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM quotes WHERE id = $1", QUOTE_COLUMNS);
    sqlx::query_as::<_, QuoteRecord>(&sql)
        .bind(quote_id)
        .fetch_optional(pool)
        .await
}

/// 查询历史候选：至少有一个价格，排除本批次新报价，按时间倒序取前 limit 条
pub async fn list_candidate_quotes(
    pool: &PgPool,
    exclude_ids: &[i64],
    limit: i64,
) -> Result<Vec<QuoteRecord>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {}
        FROM quotes
        WHERE (final_agreed_price IS NOT NULL OR initial_quote_amount IS NOT NULL)
          AND NOT (id = ANY($1))
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
        QUOTE_COLUMNS
    );
    sqlx::query_as::<_, QuoteRecord>(&sql)
        .bind(exclude_ids)
        .bind(limit)
        .fetch_all(pool)
        .await
}

fn to_decimal(value: f64) -> Option<BigDecimal> {
    BigDecimal::from_f64(value)
}

/// 批量写入匹配结果，(source, matched) 冲突时覆盖
pub async fn insert_matches(pool: &PgPool, results: &[MatchResult]) -> Result<u64, MatchError> {
    if results.is_empty() {
        return Ok(0);
    }

    tracing::debug!("Building upsert for {} matches", results.len());
    let now = Utc::now();

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO quote_matches (
            source_quote_id, matched_quote_id, similarity_score, match_breakdown,
            suggested_price, price_confidence, algorithm_version, created_at
        ) ",
    );

    query_builder.push_values(results, |mut b, m| {
        b.push_bind(m.source_quote_id)
            .push_bind(m.matched_quote_id)
            .push_bind(to_decimal(m.similarity_score))
            .push_bind(sqlx::types::Json(&m.breakdown))
            .push_bind(m.suggested_price.and_then(to_decimal))
            .push_bind(m.price_confidence.and_then(to_decimal))
            .push_bind(ALGORITHM_VERSION)
            .push_bind(now);
    });
    query_builder.push(
        " ON CONFLICT (source_quote_id, matched_quote_id) DO UPDATE SET
            similarity_score = EXCLUDED.similarity_score,
            match_breakdown = EXCLUDED.match_breakdown,
            suggested_price = EXCLUDED.suggested_price,
            price_confidence = EXCLUDED.price_confidence,
            algorithm_version = EXCLUDED.algorithm_version,
            created_at = EXCLUDED.created_at",
    );

    let execute_start = Instant::now();
    let execute_result = tokio::time::timeout(
        Duration::from_secs(PERSIST_TIMEOUT_SECS),
        query_builder.build().execute(pool),
    )
    .await;

    match execute_result {
        Ok(Ok(result)) => {
            tracing::info!(
                "✓ Upserted {} matches in {:?}",
                result.rows_affected(),
                execute_start.elapsed()
            );
            Ok(result.rows_affected())
        }
        Ok(Err(e)) => {
            tracing::error!("✗ Upsert failed after {:?}: {:?}", execute_start.elapsed(), e);
            Err(e.into())
        }
        Err(_) => {
            tracing::error!("✗ Upsert timed out (>{}s)", PERSIST_TIMEOUT_SECS);
            Err(MatchError::PersistTimeout(PERSIST_TIMEOUT_SECS))
        }
    }
}

fn option_to_csv<T: ToString>(val: Option<T>) -> String {
    val.map(|v| v.to_string()).unwrap_or_default()
}

/// 导出匹配结果为 CSV (含表头)
pub fn write_csv<W: Write>(results: &[MatchResult], writer: W) -> Result<(), MatchError> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record([
        "source_quote_id",
        "matched_quote_id",
        "similarity_score",
        "suggested_price",
        "price_confidence",
        "origin",
        "destination",
        "service_type",
        "breakdown",
    ])?;

    for m in results {
        let origin = join_place(&m.origin_city, &m.origin_state_province, &m.origin_country);
        let destination = join_place(
            &m.destination_city,
            &m.destination_state_province,
            &m.destination_country,
        );
        let breakdown = m
            .breakdown
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(";");

        writer.write_record([
            m.source_quote_id.to_string(),
            m.matched_quote_id.to_string(),
            m.similarity_score.to_string(),
            option_to_csv(m.suggested_price),
            option_to_csv(m.price_confidence),
            origin,
            destination,
            option_to_csv(m.service_type.as_deref()),
            breakdown,
        ])?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn join_place(city: &Option<String>, state: &Option<String>, country: &Option<String>) -> String {
    [city, state, country]
        .into_iter()
        .filter_map(|p| p.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}
