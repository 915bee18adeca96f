//! Metal price resolution
//!
//! Base price per gram comes from the cost chart, keyed by the metal parsed
//! out of free text. Per-metal adjustment rows and the currency-risk buffer
//! are layered on top before multiplying by the (size-adjusted) weight.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use strum::Display;
use tracing::{debug, warn};

use crate::models::{AdjustmentKind, CostValues, PriceAdjustment, keys};

static KARAT_14: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b14\s*(k|kt|karat|carat)\b|\b585\b").expect("valid regex"));
static KARAT_18: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b18\s*(k|kt|karat|carat)\b|\b750\b").expect("valid regex"));
static PLATINUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)platinum|\bpt\s*950\b|\bplat\b").expect("valid regex"));

/// Metal families with their own price per gram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MetalKind {
    #[strum(serialize = "18k")]
    #[serde(rename = "18k")]
    Gold18k,
    #[strum(serialize = "14k")]
    #[serde(rename = "14k")]
    Gold14k,
    Platinum,
}

impl MetalKind {
    /// Parse free metal text. `None` when nothing recognisable is present.
    pub fn parse(text: &str) -> Option<Self> {
        if PLATINUM.is_match(text) {
            Some(MetalKind::Platinum)
        } else if KARAT_14.is_match(text) {
            Some(MetalKind::Gold14k)
        } else if KARAT_18.is_match(text) {
            Some(MetalKind::Gold18k)
        } else {
            None
        }
    }

    /// Parse with the 18k fallback for unrecognised or missing text
    pub fn resolve(text: Option<&str>) -> Self {
        match text.and_then(Self::parse) {
            Some(kind) => kind,
            None => {
                if let Some(text) = text {
                    warn!(metal = text, "Unrecognised metal, pricing as 18k");
                }
                MetalKind::Gold18k
            }
        }
    }
}

/// Price per gram before adjustments
pub fn base_price_per_gram(kind: MetalKind, cost_values: &CostValues) -> f64 {
    let price_18k = cost_values.number(keys::PRICE_GRAM_18K);
    match kind {
        MetalKind::Gold18k => price_18k,
        MetalKind::Gold14k => cost_values
            .positive(keys::PRICE_GRAM_14K)
            .unwrap_or_else(|| {
                debug!("No 14k price configured, deriving from 18k by purity");
                price_18k * 14.0 / 18.0
            }),
        MetalKind::Platinum => cost_values
            .positive(keys::PRICE_GRAM_PLATINUM)
            .unwrap_or_else(|| {
                debug!("No platinum price configured, deriving from 18k with premium");
                price_18k * (1.0 + cost_values.number(keys::PLATINUM_PREMIUM_PCT))
            }),
    }
}

/// Apply every adjustment row for the metal: percentages compound on the
/// base price, flat rows are added afterwards.
pub fn apply_adjustments(kind: MetalKind, base: f64, adjustments: &[PriceAdjustment]) -> f64 {
    let matching = adjustments.iter().filter(|adj| MetalKind::parse(&adj.metal) == Some(kind));

    let (factor, flat) = matching.fold((1.0, 0.0), |(factor, flat), adj| match adj.kind {
        AdjustmentKind::Percent => (factor * (1.0 + adj.value), flat),
        AdjustmentKind::Flat => (factor, flat + adj.value),
    });

    base * factor + flat
}

/// Metal cost with every intermediate price per gram
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalCost {
    pub kind: MetalKind,
    pub base_price_per_gram: f64,
    pub adjusted_price_per_gram: f64,
    /// Adjusted price including the currency-risk buffer
    pub price_per_gram: f64,
    pub weight_grams: f64,
    pub cost: f64,
}

/// Metal cost for a weight already corrected for sizing.
pub fn metal_cost(
    weight_grams: f64,
    metal: Option<&str>,
    cost_values: &CostValues,
    adjustments: &[PriceAdjustment],
) -> MetalCost {
    let kind = MetalKind::resolve(metal);
    let base = base_price_per_gram(kind, cost_values);
    let adjusted = apply_adjustments(kind, base, adjustments).max(0.0);
    let price_per_gram = adjusted * (1.0 + cost_values.number(keys::DOLLAR_RISK_PCT));
    let weight_grams = if weight_grams.is_finite() {
        weight_grams.max(0.0)
    } else {
        0.0
    };

    MetalCost {
        kind,
        base_price_per_gram: base,
        adjusted_price_per_gram: adjusted,
        price_per_gram,
        weight_grams,
        cost: weight_grams * price_per_gram,
    }
}
