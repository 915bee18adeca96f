//! Diamond price lookup against the graded price chart.

use serde::Serialize;
use tracing::debug;

use crate::error::{PricingError, PricingResult};
use crate::models::{ClarityGroups, CostValues, DiamondComponent, DiamondPriceRow, keys};

/// Where a component's per-carat price came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPrice {
    pub weight: f64,
    pub count: u32,
    pub price_per_ct: f64,
    pub cost: f64,
    /// Clarity group used when the exact grade was absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_group: Option<String>,
}

/// Diamond cost for a whole breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiamondCost {
    pub components: Vec<ComponentPrice>,
    pub total_carats: f64,
    /// Chart cost before the lab multiplier
    pub natural_cost: f64,
    pub lab_multiplier: f64,
    pub total: f64,
}

/// Narrowest row among the candidates that contains the weight
fn best_row<'a>(
    rows: impl Iterator<Item = &'a DiamondPriceRow>,
    weight: f64,
) -> Option<&'a DiamondPriceRow> {
    rows.filter(|row| row.contains(weight)).min_by(|a, b| a.span().total_cmp(&b.span()))
}

/// Per-carat price for one component, falling back through the clarity group.
///
/// Returns the price and, when the fallback was used, the group name.
pub fn price_for_component(
    component: &DiamondComponent,
    clarity: &str,
    color: &str,
    chart: &[DiamondPriceRow],
    clarity_groups: Option<&ClarityGroups>,
) -> PricingResult<(f64, Option<String>)> {
    let missing = || PricingError::MissingGrade {
        clarity: clarity.trim().to_string(),
        color: color.trim().to_string(),
        weight: component.weight,
    };

    if clarity.trim().is_empty() || color.trim().is_empty() {
        return Err(missing());
    }

    let exact = best_row(
        chart.iter().filter(|row| row.matches_clarity(clarity) && row.matches_color(color)),
        component.weight,
    );
    if let Some(row) = exact {
        return Ok((row.price_per_ct, None));
    }

    if let Some((group, members)) = clarity_groups.and_then(|groups| groups.group_for(clarity)) {
        let grouped = best_row(
            chart.iter().filter(|row| {
                row.matches_color(color)
                    && (row.matches_clarity(group)
                        || members.iter().any(|member| row.matches_clarity(member)))
            }),
            component.weight,
        );
        if let Some(row) = grouped {
            debug!(
                clarity,
                color,
                group,
                row_clarity = %row.clarity,
                weight = component.weight,
                "Priced diamond via clarity group"
            );
            return Ok((row.price_per_ct, Some(group.to_string())));
        }
    }

    Err(missing())
}

/// Lab-grown stones cost a fraction of the natural chart price.
///
/// A missing or non-positive table value leaves the chart price unchanged.
pub fn lab_multiplier(is_lab_grown: bool, cost_values: &CostValues) -> f64 {
    if !is_lab_grown {
        return 1.0;
    }
    match cost_values.positive(keys::LAB_DIAMONDS_RELATIVE_COST_PCT) {
        Some(pct) => pct,
        None => {
            tracing::warn!(
                "Lab-grown stone but no lab relative cost configured; using chart price"
            );
            1.0
        }
    }
}

/// Total diamond cost: Σ weight × count × price-per-carat, then the lab multiplier.
///
/// Any component without a matching chart row fails the whole option.
pub fn diamond_cost(
    components: &[DiamondComponent],
    clarity: &str,
    color: &str,
    chart: &[DiamondPriceRow],
    clarity_groups: Option<&ClarityGroups>,
    is_lab_grown: bool,
    cost_values: &CostValues,
) -> PricingResult<DiamondCost> {
    if components.is_empty() {
        return Ok(DiamondCost {
            lab_multiplier: 1.0,
            ..Default::default()
        });
    }

    let priced = components
        .iter()
        .map(|component| {
            let (price_per_ct, via_group) =
                price_for_component(component, clarity, color, chart, clarity_groups)?;
            Ok(ComponentPrice {
                weight: component.weight,
                count: component.count,
                price_per_ct,
                cost: component.carats() * price_per_ct,
                via_group,
            })
        })
        .collect::<PricingResult<Vec<_>>>()?;

    let natural_cost: f64 = priced.iter().map(|p| p.cost).sum();
    let total_carats: f64 = components.iter().map(DiamondComponent::carats).sum();
    let multiplier = lab_multiplier(is_lab_grown, cost_values);

    Ok(DiamondCost {
        components: priced,
        total_carats,
        natural_cost,
        lab_multiplier: multiplier,
        total: natural_cost * multiplier,
    })
}
