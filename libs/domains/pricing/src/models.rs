use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use strum::{Display, EnumString};

use crate::numeric::{NumericValue, first_number};

/// Well-known cost chart keys
pub mod keys {
    pub const PRICE_GRAM_18K: &str = "price_gram_18k";
    pub const PRICE_GRAM_14K: &str = "price_gram_14k";
    pub const PRICE_GRAM_PLATINUM: &str = "price_gram_platinum";
    pub const PLATINUM_PREMIUM_PCT: &str = "platinum_premium_pct";
    pub const LABOR_FLAT: &str = "labor_flat";
    pub const LABOR_PER_GRAM: &str = "labor_per_gram";
    pub const LABOR_PER_CT: &str = "labor_per_ct";
    pub const LABOR_MARGIN_PERCENT: &str = "labor_margin_percent";
    pub const TARIFF_PERCENT: &str = "tariff_percent";
    pub const DOLLAR_RISK_PCT: &str = "dollar_risk_pct";
    pub const SHIPPING_COST_USD: &str = "shipping_cost_usd";
    pub const PRICE_PREMIUM_PCT: &str = "price_premium_pct";
    pub const PROFIT_MARGIN_PRODUCTION_PCT: &str = "profit_margin_production_pct";
    pub const PROFIT_MARGIN_SALES_PCT: &str = "profit_margin_sales_pct";
    pub const LAB_DIAMONDS_RELATIVE_COST_PCT: &str = "lab_diamonds_relative_cost_pct";
    pub const LAB_DISCOUNT_PCT: &str = "lab_discount_pct";
    pub const METAL_14K_DISCOUNT_PCT: &str = "metal_14k_discount_pct";
}

// ============================================================================
// Cost tables
// ============================================================================

/// Flat key → value cost parameters loaded from the cost chart.
///
/// Values are kept as loaded and parsed on use; absent or non-numeric values
/// read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostValues(HashMap<String, NumericValue>);

impl CostValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<NumericValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Numeric value for a key, `None` when absent or non-numeric
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(NumericValue::as_f64)
    }

    /// Numeric value for a key, zero when absent or non-numeric
    pub fn number(&self, key: &str) -> f64 {
        self.get_number(key).unwrap_or(0.0)
    }

    /// Numeric value that must be strictly positive to count as configured
    pub fn positive(&self, key: &str) -> Option<f64> {
        self.get_number(key).filter(|v| *v > 0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<NumericValue>> FromIterator<(K, V)> for CostValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One graded row of the diamond price chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiamondPriceRow {
    pub clarity: String,
    pub color: String,
    #[serde(alias = "weight_min")]
    pub weight_min: f64,
    #[serde(alias = "weight_max")]
    pub weight_max: f64,
    #[serde(alias = "price_per_ct")]
    pub price_per_ct: f64,
}

impl DiamondPriceRow {
    const WEIGHT_EPSILON: f64 = 1e-9;

    /// Inclusive containment of a carat weight in this row's bracket
    pub fn contains(&self, weight: f64) -> bool {
        weight >= self.weight_min - Self::WEIGHT_EPSILON
            && weight <= self.weight_max + Self::WEIGHT_EPSILON
    }

    pub fn span(&self) -> f64 {
        self.weight_max - self.weight_min
    }

    pub fn matches_color(&self, color: &str) -> bool {
        self.color.trim().eq_ignore_ascii_case(color.trim())
    }

    pub fn matches_clarity(&self, clarity: &str) -> bool {
        self.clarity.trim().eq_ignore_ascii_case(clarity.trim())
    }
}

/// Clarity grades bucketed into broader bands, keyed by band name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClarityGroups(BTreeMap<String, Vec<String>>);

impl ClarityGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, name: impl Into<String>, clarities: &[&str]) -> Self {
        self.0.insert(
            name.into(),
            clarities.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// Band containing a clarity grade, as `(band name, members)`
    pub fn group_for(&self, clarity: &str) -> Option<(&str, &[String])> {
        let clarity = clarity.trim();
        self.0
            .iter()
            .find(|(_, members)| members.iter().any(|m| m.trim().eq_ignore_ascii_case(clarity)))
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How an adjustment row modifies the base price per gram
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AdjustmentKind {
    /// Fractional multiplier on the base price (0.05 = +5%)
    #[default]
    Percent,
    /// Dollars added to the price per gram
    Flat,
}

/// Per-metal override layered on top of the base metal price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    /// Metal text, resolved the same way as the request's `metal` field
    pub metal: String,
    #[serde(default)]
    pub kind: AdjustmentKind,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Immutable snapshot of every table a pricing call reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingTables {
    #[serde(default)]
    pub cost_values: CostValues,
    #[serde(default)]
    pub diamond_prices: Vec<DiamondPriceRow>,
    #[serde(default)]
    pub clarity_groups: Option<ClarityGroups>,
    #[serde(default)]
    pub adjustments: Vec<PriceAdjustment>,
}

// ============================================================================
// Request record
// ============================================================================

/// Request-shaped bag of quote fields. Every field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingInputRecord {
    pub metal: Option<String>,
    pub metal_weight: Option<String>,
    pub stone: Option<String>,
    pub stone_weight: Option<String>,
    pub diamond_breakdown: Option<String>,
    pub size: Option<String>,
    pub size_label: Option<String>,
    pub size_ring: Option<String>,
    pub size_bracelet: Option<String>,
    pub size_chain: Option<String>,
    pub size_neck: Option<String>,
    pub size_wrist: Option<String>,
    pub quote_discount_type: Option<String>,
    pub quote_discount_percent: Option<String>,
}

/// Trimmed, non-empty view of an optional field
pub fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl PricingInputRecord {
    /// Stone text mentions lab-grown
    pub fn is_lab_grown(&self) -> bool {
        field(&self.stone).is_some_and(|s| s.to_ascii_lowercase().contains("lab"))
    }

    /// Metal weight in grams; missing or non-numeric reads as zero
    pub fn metal_weight_grams(&self) -> f64 {
        field(&self.metal_weight)
            .and_then(first_number)
            .filter(|w| *w > 0.0)
            .unwrap_or(0.0)
    }
}

// ============================================================================
// Engine values
// ============================================================================

/// One homogeneous group of stones of equal carat weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiamondComponent {
    pub weight: f64,
    pub count: u32,
}

impl DiamondComponent {
    pub fn new(weight: f64, count: u32) -> Self {
        Self { weight, count }
    }

    pub fn carats(&self) -> f64 {
        self.weight * self.count as f64
    }
}

/// Resolved discount for one pricing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDetails {
    /// Signed percent applied to the price (-20 = 20% off)
    pub applied_percent: f64,
    /// Percent as entered or as found in the table
    pub raw_percent: f64,
    pub summary: String,
    pub label: String,
    pub source: String,
}

impl DiscountDetails {
    pub fn none() -> Self {
        Self {
            applied_percent: 0.0,
            raw_percent: 0.0,
            summary: "none".to_string(),
            label: "none".to_string(),
            source: "none".to_string(),
        }
    }

    pub fn multiplier(&self) -> f64 {
        1.0 + self.applied_percent / 100.0
    }
}

impl Default for DiscountDetails {
    fn default() -> Self {
        Self::none()
    }
}

/// Grams of metal added (or removed) by the requested sizing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeAdjustments {
    pub ring_adjustment: f64,
    pub bracelet_adjustment: f64,
    pub chain_adjustment: f64,
    pub size_adjustment: f64,
}

/// One clarity/color combination to price
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradeOption {
    pub clarity: String,
    pub color: String,
}

impl GradeOption {
    pub fn new(clarity: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            clarity: clarity.into(),
            color: color.into(),
        }
    }
}
