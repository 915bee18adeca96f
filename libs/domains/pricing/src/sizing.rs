//! Size-driven metal weight adjustments
//!
//! A request can name its size through several fields. Each category is
//! resolved once, in a fixed precedence, before any arithmetic happens:
//!
//! | category | fields, highest precedence first                |
//! |----------|-------------------------------------------------|
//! | ring     | `size_ring`, `size` (label says ring)           |
//! | bracelet | `size_bracelet`, `size_wrist`, `size` (label)   |
//! | chain    | `size_chain`, `size_neck`, `size` (label)       |

use serde::Serialize;
use strum::Display;
use tracing::debug;

use crate::models::{CostValues, PricingInputRecord, SizeAdjustments, field};
use crate::numeric::first_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SizeCategory {
    Ring,
    Bracelet,
    Chain,
}

impl SizeCategory {
    pub const ALL: [SizeCategory; 3] = [
        SizeCategory::Ring,
        SizeCategory::Bracelet,
        SizeCategory::Chain,
    ];

    /// Category named by a free-text size label
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_ascii_lowercase();
        if label.contains("earring") {
            None
        } else if label.contains("ring") {
            Some(SizeCategory::Ring)
        } else if ["bracelet", "bangle", "wrist"].iter().any(|k| label.contains(k)) {
            Some(SizeCategory::Bracelet)
        } else if ["chain", "necklace", "neck", "pendant"].iter().any(|k| label.contains(k)) {
            Some(SizeCategory::Chain)
        } else {
            None
        }
    }

    pub fn base_key(&self) -> &'static str {
        match self {
            SizeCategory::Ring => "ring_size_base",
            SizeCategory::Bracelet => "bracelet_size_base",
            SizeCategory::Chain => "chain_size_base",
        }
    }

    pub fn step_key(&self) -> &'static str {
        match self {
            SizeCategory::Ring => "ring_size_weight_step_g",
            SizeCategory::Bracelet => "bracelet_size_weight_step_g",
            SizeCategory::Chain => "chain_size_weight_step_g",
        }
    }

    /// Record fields for this category, highest precedence first
    fn specific_fields<'a>(
        &self,
        record: &'a PricingInputRecord,
    ) -> Vec<(&'static str, Option<&'a str>)> {
        match self {
            SizeCategory::Ring => vec![("size_ring", field(&record.size_ring))],
            SizeCategory::Bracelet => vec![
                ("size_bracelet", field(&record.size_bracelet)),
                ("size_wrist", field(&record.size_wrist)),
            ],
            SizeCategory::Chain => vec![
                ("size_chain", field(&record.size_chain)),
                ("size_neck", field(&record.size_neck)),
            ],
        }
    }
}

/// A requested size after field resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeRequest {
    pub category: SizeCategory,
    /// Field the size was read from
    pub source: &'static str,
    /// `None` when the field held no number
    pub size: Option<f64>,
}

/// Resolve which field supplies each category's size
pub fn resolve_size_requests(record: &PricingInputRecord) -> Vec<SizeRequest> {
    let labelled = field(&record.size_label).and_then(SizeCategory::from_label);

    SizeCategory::ALL
        .iter()
        .filter_map(|&category| {
            let mut candidates = category.specific_fields(record);
            if labelled == Some(category) {
                candidates.push(("size", field(&record.size)));
            }
            candidates
                .into_iter()
                .find_map(|(source, value)| value.map(|v| (source, v)))
                .map(|(source, value)| SizeRequest {
                    category,
                    source,
                    size: first_number(value),
                })
        })
        .collect()
}

/// Grams implied by one resolved size: `(size - base) × step`.
///
/// A category without a configured base, or a size that is not a number,
/// contributes nothing.
pub fn adjustment_for(request: &SizeRequest, cost_values: &CostValues) -> f64 {
    let Some(size) = request.size else {
        debug!(source = request.source, "Non-numeric size, no adjustment");
        return 0.0;
    };
    let Some(base) = cost_values.positive(request.category.base_key()) else {
        debug!(category = %request.category, "No base size configured, no adjustment");
        return 0.0;
    };
    (size - base) * cost_values.number(request.category.step_key())
}

pub fn compute_size_adjustments(
    record: &PricingInputRecord,
    cost_values: &CostValues,
) -> SizeAdjustments {
    let mut adjustments = SizeAdjustments::default();
    for request in resolve_size_requests(record) {
        let grams = adjustment_for(&request, cost_values);
        match request.category {
            SizeCategory::Ring => adjustments.ring_adjustment = grams,
            SizeCategory::Bracelet => adjustments.bracelet_adjustment = grams,
            SizeCategory::Chain => adjustments.chain_adjustment = grams,
        }
    }
    adjustments.size_adjustment = adjustments.ring_adjustment
        + adjustments.bracelet_adjustment
        + adjustments.chain_adjustment;
    adjustments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_chart() -> CostValues {
        [("ring_size_base", "6"), ("ring_size_weight_step_g", "0.1")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_ring_size_is_not_double_counted() {
        let record = PricingInputRecord {
            size: Some("7".into()),
            size_label: Some("Ring".into()),
            size_ring: Some("7".into()),
            ..Default::default()
        };
        let result = compute_size_adjustments(&record, &ring_chart());
        assert!((result.ring_adjustment - 0.1).abs() < 1e-6);
        assert!((result.size_adjustment - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_generic_size_needs_a_label() {
        let record = PricingInputRecord {
            size: Some("8".into()),
            ..Default::default()
        };
        assert!(resolve_size_requests(&record).is_empty());
        let result = compute_size_adjustments(&record, &ring_chart());
        assert_eq!(result.size_adjustment, 0.0);
    }

    #[test]
    fn test_generic_size_with_label() {
        let record = PricingInputRecord {
            size: Some("8".into()),
            size_label: Some("Ring size".into()),
            ..Default::default()
        };
        let result = compute_size_adjustments(&record, &ring_chart());
        assert!((result.ring_adjustment - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_smaller_size_removes_metal() {
        let record = PricingInputRecord {
            size_ring: Some("4.5".into()),
            ..Default::default()
        };
        let result = compute_size_adjustments(&record, &ring_chart());
        assert!((result.size_adjustment + 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_aliases_resolve_to_categories() {
        let record = PricingInputRecord {
            size_neck: Some("20 in".into()),
            size_wrist: Some("7".into()),
            ..Default::default()
        };
        let chart: CostValues = [
            ("chain_size_base", "18"),
            ("chain_size_weight_step_g", "0.5"),
            ("bracelet_size_base", "6.5"),
            ("bracelet_size_weight_step_g", "0.4"),
        ]
        .into_iter()
        .collect();
        let result = compute_size_adjustments(&record, &chart);
        assert!((result.chain_adjustment - 1.0).abs() < 1e-6);
        assert!((result.bracelet_adjustment - 0.2).abs() < 1e-6);
        assert!((result.size_adjustment - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_non_numeric_size_and_missing_base() {
        let record = PricingInputRecord {
            size_ring: Some("TBD".into()),
            size_chain: Some("20".into()),
            ..Default::default()
        };
        let requests = resolve_size_requests(&record);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].size, None);
        let result = compute_size_adjustments(&record, &ring_chart());
        assert_eq!(result.size_adjustment, 0.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SizeCategory::from_label("Ring"), Some(SizeCategory::Ring));
        assert_eq!(SizeCategory::from_label("Earrings"), None);
        assert_eq!(
            SizeCategory::from_label("Tennis bracelet"),
            Some(SizeCategory::Bracelet)
        );
        assert_eq!(
            SizeCategory::from_label("Necklace length"),
            Some(SizeCategory::Chain)
        );
        assert_eq!(SizeCategory::from_label("Brooch"), None);
    }
}
