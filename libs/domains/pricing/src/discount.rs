//! Quote discount resolution.

use std::str::FromStr;

use strum::{Display, EnumString};
use tracing::debug;

use crate::metal::MetalKind;
use crate::models::{CostValues, DiscountDetails, PricingInputRecord, field, keys};
use crate::numeric::first_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Default)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DiscountType {
    #[default]
    None,
    Automatic,
    Custom,
}

impl DiscountType {
    /// Absent or unrecognised directives mean no discount
    pub fn from_record(record: &PricingInputRecord) -> Self {
        match field(&record.quote_discount_type) {
            Some(raw) => DiscountType::from_str(raw).unwrap_or_else(|_| {
                debug!(discount_type = raw, "Unrecognised discount type, ignoring");
                DiscountType::None
            }),
            None => DiscountType::None,
        }
    }
}

fn describe(applied: f64) -> String {
    if applied < 0.0 {
        format!("{}% off", format_percent(-applied))
    } else if applied > 0.0 {
        format!("{}% surcharge", format_percent(applied))
    } else {
        "none".to_string()
    }
}

fn format_percent(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Table default for an automatic discount: lab-grown stones first, then 14k metal.
fn automatic_percent(
    record: &PricingInputRecord,
    cost_values: &CostValues,
) -> Option<(f64, &'static str, &'static str)> {
    if record.is_lab_grown() {
        if let Some(pct) = cost_values.get_number(keys::LAB_DISCOUNT_PCT) {
            return Some((pct, "Lab-grown discount", keys::LAB_DISCOUNT_PCT));
        }
    }
    let metal = MetalKind::parse(field(&record.metal).unwrap_or_default());
    if metal == Some(MetalKind::Gold14k) {
        if let Some(pct) = cost_values.get_number(keys::METAL_14K_DISCOUNT_PCT) {
            return Some((pct, "14k metal discount", keys::METAL_14K_DISCOUNT_PCT));
        }
    }
    None
}

/// Resolve the discount for one pricing call.
///
/// `custom` takes `quote_discount_percent` as a reduction clamped to 0..=100;
/// `automatic` reads a signed table default; anything else is no discount.
pub fn resolve_discount_details(
    cost_values: &CostValues,
    record: &PricingInputRecord,
) -> DiscountDetails {
    match DiscountType::from_record(record) {
        DiscountType::None => DiscountDetails::none(),
        DiscountType::Custom => {
            let raw = field(&record.quote_discount_percent)
                .and_then(first_number)
                .unwrap_or(0.0);
            let applied = -raw.clamp(0.0, 100.0);
            DiscountDetails {
                applied_percent: applied,
                raw_percent: raw,
                summary: describe(applied),
                label: "Custom discount".to_string(),
                source: "quote_discount_percent".to_string(),
            }
        }
        DiscountType::Automatic => match automatic_percent(record, cost_values) {
            Some((raw, label, source)) => {
                let applied = raw.clamp(-100.0, 100.0);
                DiscountDetails {
                    applied_percent: applied,
                    raw_percent: raw,
                    summary: describe(applied),
                    label: label.to_string(),
                    source: source.to_string(),
                }
            }
            None => DiscountDetails {
                label: "Automatic discount".to_string(),
                source: "automatic".to_string(),
                ..DiscountDetails::none()
            },
        },
    }
}
