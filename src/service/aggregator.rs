//! 分项得分加权汇总

use crate::models::QuoteRecord;
use crate::service::similarity::{self, Place};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// 参与打分的属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Origin,
    Destination,
    CargoType,
    Weight,
    Dimensions,
    ServiceType,
    Hazmat,
    Pieces,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Origin,
        Attribute::Destination,
        Attribute::CargoType,
        Attribute::Weight,
        Attribute::Dimensions,
        Attribute::ServiceType,
        Attribute::Hazmat,
        Attribute::Pieces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
            Self::CargoType => "cargo_type",
            Self::Weight => "weight",
            Self::Dimensions => "dimensions",
            Self::ServiceType => "service_type",
            Self::Hazmat => "hazmat",
            Self::Pieces => "pieces",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|a| a.as_str() == value)
    }

    fn default_weight(&self) -> f64 {
        match self {
            Self::Origin | Self::Destination => 0.20,
            Self::CargoType | Self::Weight => 0.15,
            Self::Dimensions | Self::ServiceType => 0.10,
            Self::Hazmat | Self::Pieces => 0.05,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 权重表 (不可变)。表中没有的属性不参与汇总
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    weights: IndexMap<Attribute, f64>,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            weights: Attribute::ALL
                .into_iter()
                .map(|a| (a, a.default_weight()))
                .collect(),
        }
    }
}

impl WeightTable {
    pub fn empty() -> Self {
        Self {
            weights: IndexMap::new(),
        }
    }

    /// 从 属性名 -> 权重 构建；未知属性或非法权重会被忽略
    pub fn from_named<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut weights = IndexMap::new();
        for (name, weight) in entries {
            let Some(attribute) = Attribute::parse(name) else {
                tracing::warn!("Ignoring weight for unknown attribute '{}'", name);
                continue;
            };
            if !weight.is_finite() || weight < 0.0 {
                tracing::warn!("Ignoring invalid weight {} for '{}'", weight, name);
                continue;
            }
            weights.insert(attribute, weight);
        }
        Self { weights }
    }

    pub fn with(mut self, attribute: Attribute, weight: f64) -> Self {
        if weight.is_finite() && weight >= 0.0 {
            self.weights.insert(attribute, weight);
        }
        self
    }

    pub fn without(mut self, attribute: Attribute) -> Self {
        self.weights.shift_remove(&attribute);
        self
    }

    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        self.weights.get(&attribute).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        self.weights.iter().map(|(a, w)| (*a, *w))
    }
}

impl Serialize for WeightTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.weights.iter().map(|(a, w)| (a.as_str(), *w)))
    }
}

impl<'de> Deserialize<'de> for WeightTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, f64>::deserialize(deserializer)?;
        Ok(Self::from_named(raw.iter().map(|(k, v)| (k.as_str(), *v))))
    }
}

impl From<HashMap<String, f64>> for WeightTable {
    fn from(map: HashMap<String, f64>) -> Self {
        // HashMap 无序，按固定属性顺序重新排列
        let mut table = Self::from_named(map.iter().map(|(k, v)| (k.as_str(), *v)));
        let rank = |a: &Attribute| Attribute::ALL.iter().position(|x| x == a);
        table.weights.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)));
        table
    }
}

/// 一对记录的全部分项得分 (未取整)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeScores {
    pub origin: f64,
    pub destination: f64,
    pub cargo_type: f64,
    pub weight: f64,
    pub dimensions: f64,
    pub service_type: f64,
    pub hazmat: f64,
    pub pieces: f64,
}

impl AttributeScores {
    pub fn compute(query: &QuoteRecord, candidate: &QuoteRecord) -> Self {
        Self {
            origin: similarity::location_similarity(&origin_of(query), &origin_of(candidate)),
            destination: similarity::location_similarity(
                &destination_of(query),
                &destination_of(candidate),
            ),
            cargo_type: similarity::cargo_similarity(
                query.cargo_description.as_deref(),
                candidate.cargo_description.as_deref(),
            ),
            weight: similarity::weight_similarity(
                query.cargo_weight.as_ref(),
                query.weight_unit.as_deref(),
                candidate.cargo_weight.as_ref(),
                candidate.weight_unit.as_deref(),
            ),
            dimensions: similarity::dimensions_similarity(
                &query.dimensions(),
                &candidate.dimensions(),
            ),
            service_type: similarity::exact_match(
                query.service_type.as_deref(),
                candidate.service_type.as_deref(),
            ),
            hazmat: similarity::exact_match(query.is_hazmat, candidate.is_hazmat),
            pieces: similarity::numeric_similarity(
                query.piece_count.map(f64::from),
                candidate.piece_count.map(f64::from),
                similarity::PIECES_TOLERANCE,
            ),
        }
    }

    pub fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Origin => self.origin,
            Attribute::Destination => self.destination,
            Attribute::CargoType => self.cargo_type,
            Attribute::Weight => self.weight,
            Attribute::Dimensions => self.dimensions,
            Attribute::ServiceType => self.service_type,
            Attribute::Hazmat => self.hazmat,
            Attribute::Pieces => self.pieces,
        }
    }
}

fn origin_of(q: &QuoteRecord) -> Place<'_> {
    Place {
        city: q.origin_city.as_deref(),
        state: q.origin_state_province.as_deref(),
        country: q.origin_country.as_deref(),
    }
}

fn destination_of(q: &QuoteRecord) -> Place<'_> {
    Place {
        city: q.destination_city.as_deref(),
        state: q.destination_state_province.as_deref(),
        country: q.destination_country.as_deref(),
    }
}

/// 汇总结果：总分 + 分项明细 (均已保留 4 位小数)
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub score: f64,
    pub breakdown: IndexMap<String, f64>,
}

/// 保留 4 位小数，保证跨平台持久化/比较时数值稳定
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub fn aggregate(scores: &AttributeScores, weights: &WeightTable) -> Aggregate {
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (attribute, weight) in weights.iter() {
        total += scores.get(attribute) * weight;
        weight_sum += weight;
    }

    let score = if weight_sum > 0.0 {
        (total / weight_sum).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let breakdown = Attribute::ALL
        .into_iter()
        .map(|a| (a.as_str().to_string(), round4(scores.get(a).clamp(0.0, 1.0))))
        .collect();

    Aggregate {
        score: round4(score),
        breakdown,
    }
}
