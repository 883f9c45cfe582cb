//! 宽松数值解析：上游抽取结果里数值字段可能是数字、字符串或垃圾值，
//! 解析失败一律视为缺失 (None)，不让整个请求失败。

use bigdecimal::BigDecimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
    Other(IgnoredAny),
}

/// 解析文本形式的十进制数
pub fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigDecimal::from_str(trimmed).ok()
}

pub fn decimal<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrText::Number(n)) => parse_decimal(&n.to_string()),
        Some(NumberOrText::Text(s)) => parse_decimal(&s),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

pub fn integer<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrText::Number(n)) => match n.as_i64() {
            Some(v) => i32::try_from(v).ok(),
            None => n.as_f64().and_then(whole_i32),
        },
        Some(NumberOrText::Text(s)) => s.trim().parse::<f64>().ok().and_then(whole_i32),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

/// 1.0 这类整数值浮点也接受
fn whole_i32(value: f64) -> Option<i32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrText {
    Bool(bool),
    Text(String),
    Other(IgnoredAny),
}

pub fn boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<BoolOrText>::deserialize(deserializer)?;
    Ok(match value {
        Some(BoolOrText::Bool(b)) => Some(b),
        Some(BoolOrText::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        Some(BoolOrText::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "decimal")]
        amount: Option<BigDecimal>,
        #[serde(default, deserialize_with = "integer")]
        pieces: Option<i32>,
        #[serde(default, deserialize_with = "boolean")]
        hazmat: Option<bool>,
    }

    fn fields(json: &str) -> Fields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let p = fields(r#"{"amount": 2200.5, "pieces": 4}"#);
        assert_eq!(p.amount, Some(BigDecimal::from_str("2200.5").unwrap()));
        assert_eq!(p.pieces, Some(4));

        let p = fields(r#"{"amount": " 1200 ", "pieces": "12"}"#);
        assert_eq!(p.amount, Some(BigDecimal::from(1200)));
        assert_eq!(p.pieces, Some(12));
    }

    #[test]
    fn garbage_becomes_none() {
        let p = fields(r#"{"amount": "call us", "pieces": "a few"}"#);
        assert!(p.amount.is_none());
        assert!(p.pieces.is_none());

        let p = fields(r#"{"amount": {"value": 3}, "pieces": [1, 2]}"#);
        assert!(p.amount.is_none());
        assert!(p.pieces.is_none());
    }

    #[test]
    fn null_and_missing_are_none() {
        let p = fields(r#"{"amount": null}"#);
        assert!(p.amount.is_none());
        assert!(p.pieces.is_none());
    }

    #[test]
    fn fractional_piece_count_is_rejected() {
        assert_eq!(fields(r#"{"pieces": 3.0}"#).pieces, Some(3));
        assert!(fields(r#"{"pieces": 2.5}"#).pieces.is_none());
        assert_eq!(fields(r#"{"pieces": "3.0"}"#).pieces, Some(3));
        assert!(fields(r#"{"pieces": "2.5"}"#).pieces.is_none());
        assert!(fields(r#"{"pieces": "1e12"}"#).pieces.is_none());
    }

    #[test]
    fn booleans_accept_common_text_forms() {
        assert_eq!(fields(r#"{"hazmat": true}"#).hazmat, Some(true));
        assert_eq!(fields(r#"{"hazmat": "TRUE"}"#).hazmat, Some(true));
        assert_eq!(fields(r#"{"hazmat": " yes "}"#).hazmat, Some(true));
        assert_eq!(fields(r#"{"hazmat": "false"}"#).hazmat, Some(false));
        assert_eq!(fields(r#"{"hazmat": "No"}"#).hazmat, Some(false));
        assert!(fields(r#"{"hazmat": "maybe"}"#).hazmat.is_none());
        assert!(fields(r#"{"hazmat": 1}"#).hazmat.is_none());
        assert!(fields(r#"{"hazmat": null}"#).hazmat.is_none());
    }
}
