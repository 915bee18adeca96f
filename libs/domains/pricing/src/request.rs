//! Estimate request/response shapes
//!
//! Requests come from storefront and admin clients that are loose about
//! types and casing, so every field accepts snake_case or camelCase and any
//! scalar JSON value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::engine::{PriceBreakdown, PricedOption};
use crate::error::{PricingError, PricingResult};
use crate::models::{DiamondComponent, DiscountDetails, PricingInputRecord};
use crate::numeric::NumericValue;

/// Scalars become strings, arrays are joined line by line, anything else is absent
fn lenient_text(value: &Value) -> Option<String> {
    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    match value {
        Value::Array(items) => {
            let lines: Vec<String> = items.iter().filter_map(scalar).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        other => scalar(other),
    }
}

/// First non-blank text among `keys`, so a client sending both casings
/// with one left empty still gets the filled one.
fn first_text(payload: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| payload.get(*key).and_then(lenient_text))
        .find(|text| !text.trim().is_empty())
}

fn first_present(payload: &Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|key| payload.get(*key))
        .find(|value| !value.is_null())
        .cloned()
}

#[derive(Debug, Clone, Default)]
pub struct EstimateRequest {
    pub metal: Option<String>,
    pub metal_weight: Option<String>,
    pub stone: Option<String>,
    pub stone_weight: Option<String>,
    pub diamond_breakdown: Option<String>,
    pub diamond_breakdown_components: Option<Value>,
    pub size: Option<String>,
    pub size_label: Option<String>,
    pub size_ring: Option<String>,
    pub size_bracelet: Option<String>,
    pub size_chain: Option<String>,
    pub size_neck: Option<String>,
    pub size_wrist: Option<String>,
    pub quote_discount_type: Option<String>,
    pub quote_discount_percent: Option<String>,
    pub clarity: Option<String>,
    pub color: Option<String>,
    /// Only a literal `true` turns on the debug breakdown
    pub debug: Option<Value>,
}

impl<'de> Deserialize<'de> for EstimateRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let payload = Map::<String, Value>::deserialize(deserializer)?;
        let text = |keys: &[&str]| first_text(&payload, keys);

        Ok(Self {
            metal: text(&["metal"]),
            metal_weight: text(&["metal_weight", "metalWeight"]),
            stone: text(&["stone"]),
            stone_weight: text(&["stone_weight", "stoneWeight"]),
            diamond_breakdown: text(&["diamond_breakdown", "diamondBreakdown"]),
            diamond_breakdown_components: first_present(
                &payload,
                &["diamond_breakdown_components", "diamondBreakdownComponents"],
            ),
            size: text(&["size"]),
            size_label: text(&["size_label", "sizeLabel"]),
            size_ring: text(&["size_ring", "sizeRing"]),
            size_bracelet: text(&["size_bracelet", "sizeBracelet"]),
            size_chain: text(&["size_chain", "sizeChain"]),
            size_neck: text(&["size_neck", "sizeNeck"]),
            size_wrist: text(&["size_wrist", "sizeWrist"]),
            quote_discount_type: text(&["quote_discount_type", "quoteDiscountType"]),
            quote_discount_percent: text(&["quote_discount_percent", "quoteDiscountPercent"]),
            clarity: text(&["clarity"]),
            color: text(&["color"]),
            debug: payload.get("debug").cloned(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    weight: NumericValue,
    #[serde(default)]
    count: Option<NumericValue>,
}

impl EstimateRequest {
    pub fn to_record(&self) -> PricingInputRecord {
        PricingInputRecord {
            metal: self.metal.clone(),
            metal_weight: self.metal_weight.clone(),
            stone: self.stone.clone(),
            stone_weight: self.stone_weight.clone(),
            diamond_breakdown: self.diamond_breakdown.clone(),
            size: self.size.clone(),
            size_label: self.size_label.clone(),
            size_ring: self.size_ring.clone(),
            size_bracelet: self.size_bracelet.clone(),
            size_chain: self.size_chain.clone(),
            size_neck: self.size_neck.clone(),
            size_wrist: self.size_wrist.clone(),
            quote_discount_type: self.quote_discount_type.clone(),
            quote_discount_percent: self.quote_discount_percent.clone(),
        }
    }

    pub fn wants_debug(&self) -> bool {
        matches!(self.debug, Some(Value::Bool(true)))
    }

    pub fn clarity(&self) -> &str {
        self.clarity.as_deref().unwrap_or_default().trim()
    }

    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or_default().trim()
    }

    /// Pre-parsed components, given either as a JSON array or a string holding one.
    ///
    /// `Ok(None)` when absent or empty; malformed entries are an error because
    /// they drive the diamond cost.
    pub fn diamond_components(&self) -> PricingResult<Option<Vec<DiamondComponent>>> {
        let value = match &self.diamond_breakdown_components {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => serde_json::from_str::<Value>(s).map_err(|e| {
                PricingError::InvalidInput(format!("diamond_breakdown_components: {e}"))
            })?,
            Some(other) => other.clone(),
        };

        let raw: Vec<RawComponent> = serde_json::from_value(value).map_err(|e| {
            PricingError::InvalidInput(format!("diamond_breakdown_components: {e}"))
        })?;
        if raw.is_empty() {
            return Ok(None);
        }

        raw.into_iter()
            .map(|entry| {
                let weight = entry.weight.as_f64().filter(|w| *w > 0.0);
                let count = match &entry.count {
                    Some(count) => count.as_f64(),
                    None => Some(1.0),
                };
                match (weight, count) {
                    (Some(weight), Some(count)) if count >= 1.0 && count.fract() == 0.0 => {
                        Ok(DiamondComponent::new(weight, count as u32))
                    }
                    _ => Err(PricingError::InvalidInput(format!(
                        "diamond component needs a positive weight and whole count: {:?}",
                        entry
                    ))),
                }
            })
            .collect::<PricingResult<Vec<_>>>()
            .map(Some)
    }
}

/// Display metadata about the applied discount
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateMeta {
    pub discount_summary: String,
    pub discount_percent: f64,
}

/// `{ ok: true, price, meta, debug? }` or `{ ok: false, error }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EstimateMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<PriceBreakdown>,
    #[serde(skip)]
    pub code: Option<&'static str>,
}

impl EstimateResponse {
    pub fn priced(priced: PricedOption, discount: &DiscountDetails, include_debug: bool) -> Self {
        Self {
            ok: true,
            price: Some(priced.price),
            error: None,
            meta: Some(EstimateMeta {
                discount_summary: discount.summary.clone(),
                discount_percent: discount.applied_percent,
            }),
            debug: include_debug.then_some(priced.debug),
            code: None,
        }
    }

    pub fn failed(error: &PricingError) -> Self {
        Self {
            ok: false,
            price: None,
            error: Some(error.to_string()),
            meta: None,
            debug: None,
            code: Some(error.code()),
        }
    }
}
