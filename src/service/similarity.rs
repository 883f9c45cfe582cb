//! 分项相似度计算，全部为纯函数，结果在 [0, 1]。
//! 数据缺失不是错误，只是该项得 0 (个别函数另有说明)。

use bigdecimal::{BigDecimal, ToPrimitive};
use std::collections::HashSet;

/// 各属性的数值容差 (相对差达到容差时得分降为 0)
pub const WEIGHT_TOLERANCE: f64 = 0.3;
pub const PIECES_TOLERANCE: f64 = 0.3;
pub const VOLUME_TOLERANCE: f64 = 0.4;

const LBS_TO_KG: f64 = 0.453592;
const TON_TO_KG: f64 = 1000.0;

/// 地点各部分权重
const COUNTRY_WEIGHT: f64 = 0.4;
const CITY_WEIGHT: f64 = 0.4;
const STATE_WEIGHT: f64 = 0.2;

/// 地点 (城市 / 州省 / 国家)
#[derive(Debug, Clone, Copy, Default)]
pub struct Place<'a> {
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub country: Option<&'a str>,
}

fn present(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

pub fn decimal_to_f64(value: &BigDecimal) -> Option<f64> {
    value.to_f64().filter(|v| v.is_finite())
}

/// 归一化编辑距离相似度，忽略大小写
pub fn string_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    match (present(a), present(b)) {
        (None, None) => 1.0,
        (None, _) | (_, None) => 0.0,
        (Some(a), Some(b)) => {
            let a = a.to_lowercase();
            let b = b.to_lowercase();
            let max_len = a.chars().count().max(b.chars().count());
            if max_len == 0 {
                return 1.0;
            }
            let distance = strsim::levenshtein(&a, &b);
            (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
        }
    }
}

/// 地点相似度：只在双方都有的字段上加权平均，缺失字段不进分母
pub fn location_similarity(a: &Place<'_>, b: &Place<'_>) -> f64 {
    let components = [
        (a.country, b.country, COUNTRY_WEIGHT),
        (a.city, b.city, CITY_WEIGHT),
        (a.state, b.state, STATE_WEIGHT),
    ];

    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (x, y, weight) in components {
        if let (Some(x), Some(y)) = (present(x), present(y)) {
            total += string_similarity(Some(x), Some(y)) * weight;
            weight_sum += weight;
        }
    }

    if weight_sum > 0.0 {
        total / weight_sum
    } else {
        0.0
    }
}

/// 相对差容差比较
pub fn numeric_similarity(v1: Option<f64>, v2: Option<f64>, tolerance: f64) -> f64 {
    let (Some(v1), Some(v2)) = (v1, v2) else {
        return 0.0;
    };
    if !v1.is_finite() || !v2.is_finite() {
        return 0.0;
    }
    if v1 == 0.0 && v2 == 0.0 {
        return 1.0;
    }
    if tolerance <= 0.0 {
        return if v1 == v2 { 1.0 } else { 0.0 };
    }

    let relative = (v1 - v2).abs() / v1.abs().max(v2.abs());
    (1.0 - relative / tolerance).max(0.0)
}

/// 换算为千克；未知单位按 kg 处理
pub fn to_kilograms(weight: f64, unit: Option<&str>) -> f64 {
    let unit = unit.map(|u| u.trim().to_lowercase()).unwrap_or_default();
    if unit == "lb" || unit == "lbs" || unit.starts_with("pound") {
        weight * LBS_TO_KG
    } else if unit == "t" || unit.starts_with("ton") {
        weight * TON_TO_KG
    } else {
        weight
    }
}

/// 重量相似度 (统一换算为 kg 后比较，容差 0.3)
pub fn weight_similarity(
    w1: Option<&BigDecimal>,
    u1: Option<&str>,
    w2: Option<&BigDecimal>,
    u2: Option<&str>,
) -> f64 {
    let kg1 = w1.and_then(decimal_to_f64).map(|w| to_kilograms(w, u1));
    let kg2 = w2.and_then(decimal_to_f64).map(|w| to_kilograms(w, u2));
    match (kg1, kg2) {
        (Some(a), Some(b)) => numeric_similarity(Some(a), Some(b), WEIGHT_TOLERANCE),
        _ => 0.0,
    }
}

/// 体积代理值：只把已填写的尺寸相乘
///
/// 只有长度的记录会把长度当作"体积"，与完整尺寸的记录比较时会失真。
/// 保留这一行为以保证与历史打分一致。
pub fn volume_proxy(dims: &[Option<&BigDecimal>]) -> Option<f64> {
    let values: Vec<f64> = dims
        .iter()
        .flatten()
        .filter_map(|d| decimal_to_f64(d))
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().product())
    }
}

pub fn dimensions_similarity(a: &[Option<&BigDecimal>], b: &[Option<&BigDecimal>]) -> f64 {
    match (volume_proxy(a), volume_proxy(b)) {
        (Some(v1), Some(v2)) => numeric_similarity(Some(v1), Some(v2), VOLUME_TOLERANCE),
        _ => 0.0,
    }
}

/// 货物描述分词：小写，非字母数字替换为空白，丢弃长度 <= 2 的词
pub fn tokenize(text: &str) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// 货物描述 Jaccard 相似度
pub fn cargo_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    let tokens_a = a.map(tokenize).unwrap_or_default();
    let tokens_b = b.map(tokenize).unwrap_or_default();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f64 / union as f64
}

/// 精确匹配 (转字符串后忽略大小写比较)
pub fn exact_match<T: ToString>(a: Option<T>, b: Option<T>) -> f64 {
    match (a, b) {
        (None, None) => 1.0,
        (None, _) | (_, None) => 0.0,
        (Some(a), Some(b)) => {
            let a = a.to_string();
            let b = b.to_string();
            if a.to_lowercase() == b.to_lowercase() {
                1.0
            } else {
                0.0
            }
        }
    }
}
