use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Category written when the platform offers none.
pub const DEFAULT_CATEGORY: &str = "Others";

/// Custom category label used when the caller supplies a blank one.
pub const UNKNOWN_CUSTOM_CATEGORY: &str = "未知分类";

/// Export column headers, in output order.
pub const COLUMNS: [&str; 11] = [
    "SKU",
    "Name",
    "Categories",
    "Regular price",
    "cf_opingts",
    "Description",
    "Images",
    "自定义分类",
    "原站域名",
    "分布网站识别",
    "语言",
];

/// One exported catalog row. Both platform extractors produce exactly this
/// shape; field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Categories")]
    pub categories: String,
    /// USD price, always carrying exactly two decimal places.
    #[serde(rename = "Regular price")]
    pub regular_price: Decimal,
    /// Reserved passthrough column, always empty.
    #[serde(rename = "cf_opingts")]
    pub cf_opingts: String,
    /// Sanitized HTML; may be empty.
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Images")]
    pub images: String,
    #[serde(rename = "自定义分类")]
    pub custom_category: String,
    #[serde(rename = "原站域名")]
    pub origin_domain: String,
    /// Reserved distribution flag, always `0`.
    #[serde(rename = "分布网站识别")]
    pub distribution_flag: u8,
    #[serde(rename = "语言")]
    pub language: String,
}

/// Rounds a price to cents and pins the scale to two places, so `12.5`
/// serializes as `"12.50"`.
#[must_use]
pub fn round_price(price: Decimal) -> Decimal {
    let mut rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
