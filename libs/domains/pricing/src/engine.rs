//! Option pricing
//!
//! Combines breakdown parsing, diamond lookup, sizing, metal cost, the cost
//! layers and the discount into one rounded dollar price per clarity/color
//! option. Pure: identical inputs and table snapshots give identical prices.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::breakdown::DiamondBreakdownParser;
use crate::diamonds::{DiamondCost, diamond_cost};
use crate::error::{PricingError, PricingResult};
use crate::layering::{CostLayers, layer_costs};
use crate::metal::{MetalCost, metal_cost};
use crate::models::{
    ClarityGroups, CostValues, DiamondComponent, DiamondPriceRow, DiscountDetails,
    PriceAdjustment, PricingInputRecord, PricingTables, SizeAdjustments, field,
};
use crate::sizing::compute_size_adjustments;

/// Every intermediate value behind a quoted price
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub clarity: String,
    pub color: String,
    pub diamonds: DiamondCost,
    pub size: SizeAdjustments,
    pub metal: MetalCost,
    pub layers: CostLayers,
    pub discount_percent: f64,
    pub unrounded_price: f64,
}

/// A successfully priced option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedOption {
    /// Whole dollars, never negative
    pub price: i64,
    pub debug: PriceBreakdown,
}

/// Wire shape of a pricing result: `{ ok, price, debug? }` or `{ ok, error }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<PriceBreakdown>,
    /// Machine-readable failure code, kept off the wire
    #[serde(skip)]
    pub code: Option<&'static str>,
}

impl PricingOutcome {
    pub fn from_result(result: PricingResult<PricedOption>, include_debug: bool) -> Self {
        match result {
            Ok(priced) => Self {
                ok: true,
                price: Some(priced.price),
                error: None,
                debug: include_debug.then_some(priced.debug),
                code: None,
            },
            Err(err) => Self {
                ok: false,
                price: None,
                error: Some(err.to_string()),
                debug: None,
                code: Some(err.code()),
            },
        }
    }
}

fn validate_components(components: &[DiamondComponent]) -> PricingResult<()> {
    match components.iter().find(|c| !c.weight.is_finite() || c.weight <= 0.0 || c.count == 0) {
        Some(bad) => Err(PricingError::InvalidInput(format!(
            "diamond component must have a positive weight and count (got {}ct x {})",
            bad.weight, bad.count
        ))),
        None => Ok(()),
    }
}

/// Price one clarity/color option.
///
/// `diamond_components` overrides the record's breakdown when supplied.
#[allow(clippy::too_many_arguments)]
#[instrument(level = "debug", skip_all, fields(clarity = clarity, color = color))]
pub fn compute_option_price_from_costs(
    record: &PricingInputRecord,
    clarity: &str,
    color: &str,
    cost_values: &CostValues,
    diamond_prices: &[DiamondPriceRow],
    clarity_groups: Option<&ClarityGroups>,
    adjustments: &[PriceAdjustment],
    discount: &DiscountDetails,
    diamond_components: Option<&[DiamondComponent]>,
) -> PricingResult<PricedOption> {
    let parsed;
    let components = match diamond_components {
        Some(supplied) => {
            validate_components(supplied)?;
            supplied
        }
        None => {
            parsed = DiamondBreakdownParser::default().from_record(record);
            parsed.as_slice()
        }
    };

    let diamonds = diamond_cost(
        components,
        clarity,
        color,
        diamond_prices,
        clarity_groups,
        record.is_lab_grown(),
        cost_values,
    )?;

    let size = compute_size_adjustments(record, cost_values);
    let metal_grams = (record.metal_weight_grams() + size.size_adjustment).max(0.0);
    let metal = metal_cost(
        metal_grams,
        field(&record.metal),
        cost_values,
        adjustments,
    );

    let material_cost = diamonds.total + metal.cost;
    let layers = layer_costs(
        material_cost,
        metal.weight_grams,
        diamonds.total_carats,
        cost_values,
    );

    let unrounded_price = layers.pre_discount_price * discount.multiplier();
    if !unrounded_price.is_finite() {
        return Err(PricingError::Internal(format!(
            "price for {clarity}/{color} is not a finite number ({unrounded_price})"
        )));
    }
    let price = unrounded_price.round().max(0.0) as i64;

    debug!(
        diamond_cost = diamonds.total,
        metal_cost = metal.cost,
        pre_discount = layers.pre_discount_price,
        price,
        "Priced option"
    );

    Ok(PricedOption {
        price,
        debug: PriceBreakdown {
            clarity: clarity.trim().to_string(),
            color: color.trim().to_string(),
            diamonds,
            size,
            metal,
            layers,
            discount_percent: discount.applied_percent,
            unrounded_price,
        },
    })
}

/// Convenience wrapper reading every table from one snapshot
pub fn price_option(
    record: &PricingInputRecord,
    clarity: &str,
    color: &str,
    tables: &PricingTables,
    discount: &DiscountDetails,
    diamond_components: Option<&[DiamondComponent]>,
) -> PricingResult<PricedOption> {
    compute_option_price_from_costs(
        record,
        clarity,
        color,
        &tables.cost_values,
        &tables.diamond_prices,
        tables.clarity_groups.as_ref(),
        &tables.adjustments,
        discount,
        diamond_components,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vs1_f(min: f64, max: f64, price: f64) -> DiamondPriceRow {
        DiamondPriceRow {
            clarity: "VS1".into(),
            color: "F".into(),
            weight_min: min,
            weight_max: max,
            price_per_ct: price,
        }
    }

    #[test]
    fn test_gold_only_piece_needs_no_grade() {
        let record = PricingInputRecord {
            metal: Some("18k".into()),
            metal_weight: Some("4".into()),
            ..Default::default()
        };
        let values: CostValues = [("price_gram_18k", "60")].into_iter().collect();
        let priced = compute_option_price_from_costs(
            &record,
            "",
            "",
            &values,
            &[],
            None,
            &[],
            &DiscountDetails::none(),
            None,
        )
        .unwrap();
        assert_eq!(priced.price, 240);
    }

    #[test]
    fn test_supplied_components_override_record() {
        let record = PricingInputRecord {
            diamond_breakdown: Some("0.2 x 10".into()),
            ..Default::default()
        };
        let components = [DiamondComponent::new(1.0, 1)];
        let priced = compute_option_price_from_costs(
            &record,
            "VS1",
            "F",
            &CostValues::new(),
            &[vs1_f(0.0, 5.0, 1000.0)],
            None,
            &[],
            &DiscountDetails::none(),
            Some(&components),
        )
        .unwrap();
        assert_eq!(priced.price, 1000);
    }

    #[test]
    fn test_invalid_supplied_components_fail() {
        let components = [DiamondComponent::new(-1.0, 1)];
        let err = compute_option_price_from_costs(
            &PricingInputRecord::default(),
            "VS1",
            "F",
            &CostValues::new(),
            &[vs1_f(0.0, 5.0, 1000.0)],
            None,
            &[],
            &DiscountDetails::none(),
            Some(&components),
        )
        .unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn test_discount_applies_last() {
        let record = PricingInputRecord {
            stone_weight: Some("1".into()),
            ..Default::default()
        };
        let discount = DiscountDetails {
            applied_percent: -10.0,
            raw_percent: 10.0,
            summary: "10% off".into(),
            label: "Custom discount".into(),
            source: "quote_discount_percent".into(),
        };
        let priced = compute_option_price_from_costs(
            &record,
            "VS1",
            "F",
            &CostValues::new(),
            &[vs1_f(0.0, 5.0, 1000.0)],
            None,
            &[],
            &discount,
            None,
        )
        .unwrap();
        assert_eq!(priced.price, 900);
        assert_eq!(priced.debug.discount_percent, -10.0);
    }

    #[test]
    fn test_overflowing_costs_are_an_error_not_a_zero_price() {
        let record = PricingInputRecord {
            metal: Some("18k".into()),
            metal_weight: Some("10".into()),
            ..Default::default()
        };
        let mut values = CostValues::new();
        values.insert("price_gram_18k", 1e308);
        let err = compute_option_price_from_costs(
            &record,
            "",
            "",
            &values,
            &[],
            None,
            &[],
            &DiscountDetails::none(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.code(), "internal");
        assert!(!err.is_option_failure());
    }

    #[test]
    fn test_outcome_shapes() {
        let failed = PricingOutcome::from_result(
            Err(PricingError::InvalidInput("weight".into())),
            true,
        );
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["ok"], false);
        assert!(json.get("price").is_none());
        assert!(json["error"].as_str().unwrap().contains("weight"));
    }
}
