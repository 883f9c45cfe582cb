use crate::models::lenient;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 报价记录 (quotes 表)，既可作为查询记录，也可作为历史候选
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: i64,

    #[serde(default)]
    pub origin_city: Option<String>,
    #[serde(default)]
    pub origin_state_province: Option<String>,
    #[serde(default)]
    pub origin_country: Option<String>,

    #[serde(default)]
    pub destination_city: Option<String>,
    #[serde(default)]
    pub destination_state_province: Option<String>,
    #[serde(default)]
    pub destination_country: Option<String>,

    #[serde(default)]
    pub cargo_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cargo_weight: Option<BigDecimal>,
    #[serde(default)]
    pub weight_unit: Option<String>,        // 缺省按 kg
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cargo_length: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cargo_width: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cargo_height: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub piece_count: Option<i32>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_hazmat: Option<bool>,            // None = 未说明，与 Some(false) 不同

    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub initial_quote_amount: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub final_agreed_price: Option<BigDecimal>, // 成交价，优先于初始报价
}

/// 价格来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    FinalAgreed,
    InitialQuote,
}

impl QuoteRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// 已填写的尺寸 (长/宽/高)
    pub fn dimensions(&self) -> [Option<&BigDecimal>; 3] {
        [
            self.cargo_length.as_ref(),
            self.cargo_width.as_ref(),
            self.cargo_height.as_ref(),
        ]
    }
}
