//! Labour, production, tariff and margin layers.
//!
//! Layers are applied in a fixed order and never rounded in between:
//! production margin → tariff (on production + shipping) → price premium →
//! sales margin. The discount and final rounding happen in the engine.

use serde::Serialize;

use crate::models::{CostValues, keys};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborCost {
    pub base: f64,
    pub labor_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCost {
    pub production_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffCost {
    pub tariff_base: f64,
    pub tariff_cost: f64,
}

/// `labor_flat + labor_per_gram × grams + labor_per_ct × carats`, inflated by the labour margin
pub fn compute_labor_cost(
    metal_grams: f64,
    total_carats: f64,
    cost_values: &CostValues,
) -> LaborCost {
    let base = cost_values.number(keys::LABOR_FLAT)
        + cost_values.number(keys::LABOR_PER_GRAM) * metal_grams
        + cost_values.number(keys::LABOR_PER_CT) * total_carats;
    LaborCost {
        base,
        labor_cost: base * (1.0 + cost_values.number(keys::LABOR_MARGIN_PERCENT)),
    }
}

/// `(material + labour) × (1 + profit_margin_production_pct)`
pub fn compute_production_cost(
    material_cost: f64,
    labor_cost: f64,
    cost_values: &CostValues,
) -> ProductionCost {
    ProductionCost {
        production_cost: (material_cost + labor_cost)
            * (1.0 + cost_values.number(keys::PROFIT_MARGIN_PRODUCTION_PCT)),
    }
}

/// Tariff is charged on production cost plus shipping
pub fn compute_tariff_cost(
    production_cost: f64,
    shipping_cost: f64,
    cost_values: &CostValues,
) -> TariffCost {
    let tariff_base = production_cost + shipping_cost;
    TariffCost {
        tariff_base,
        tariff_cost: tariff_base * cost_values.number(keys::TARIFF_PERCENT),
    }
}

/// Every layer from material cost to the pre-discount price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLayers {
    pub material_cost: f64,
    pub labor: LaborCost,
    pub production_cost: f64,
    pub shipping_cost: f64,
    pub tariff_base: f64,
    pub tariff_cost: f64,
    /// Production + shipping + tariff
    pub landed_cost: f64,
    pub after_premium: f64,
    pub pre_discount_price: f64,
}

pub fn layer_costs(
    material_cost: f64,
    metal_grams: f64,
    total_carats: f64,
    cost_values: &CostValues,
) -> CostLayers {
    let labor = compute_labor_cost(metal_grams, total_carats, cost_values);
    let production = compute_production_cost(material_cost, labor.labor_cost, cost_values);
    let shipping_cost = cost_values.number(keys::SHIPPING_COST_USD);
    let tariff = compute_tariff_cost(production.production_cost, shipping_cost, cost_values);

    let landed_cost = tariff.tariff_base + tariff.tariff_cost;
    let after_premium = landed_cost * (1.0 + cost_values.number(keys::PRICE_PREMIUM_PCT));
    let pre_discount_price =
        after_premium * (1.0 + cost_values.number(keys::PROFIT_MARGIN_SALES_PCT));

    CostLayers {
        material_cost,
        labor,
        production_cost: production.production_cost,
        shipping_cost,
        tariff_base: tariff.tariff_base,
        tariff_cost: tariff.tariff_cost,
        landed_cost,
        after_premium,
        pre_discount_price,
    }
}
