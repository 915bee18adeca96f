//! Diamond breakdown parsing
//!
//! Turns a free-form multi-stone description such as `"0.2 x 10, 1.5ct x 2"`
//! (or a single `stone_weight`) into a list of `{ weight, count }` groups.
//! Malformed tokens are dropped; parsing never fails.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::{DiamondComponent, PricingInputRecord, field};
use crate::numeric::{all_numbers, first_number};

const NUMBER: &str = r"(\d+(?:\.\d+)?|\.\d+)";
const CARAT_UNIT: &str = r"(cts?|carats?)";

static EXPLICIT_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){NUMBER}\s*{CARAT_UNIT}?\s*[x×*]\s*{NUMBER}\s*{CARAT_UNIT}?"
    ))
    .expect("valid breakdown regex")
});

static CARAT_WEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i){NUMBER}\s*{CARAT_UNIT}\b")).expect("valid carat regex")
});

/// How two bare numbers without a separator are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BreakdownMode {
    /// Smaller number is the carat weight, larger is the count
    #[default]
    Lenient,
    /// Ambiguous tokens are dropped
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiamondBreakdownParser {
    mode: BreakdownMode,
}

impl DiamondBreakdownParser {
    pub fn new(mode: BreakdownMode) -> Self {
        Self { mode }
    }

    /// Components for a record: the breakdown when it yields anything,
    /// otherwise the single `stone_weight`, otherwise no stones.
    pub fn from_record(&self, record: &PricingInputRecord) -> Vec<DiamondComponent> {
        self.parse(
            field(&record.diamond_breakdown),
            field(&record.stone_weight),
        )
    }

    pub fn parse(
        &self,
        breakdown: Option<&str>,
        stone_weight: Option<&str>,
    ) -> Vec<DiamondComponent> {
        if let Some(text) = breakdown {
            let components: Vec<DiamondComponent> = text
                .split([',', ';', '\n'])
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .filter_map(|token| self.parse_token(token))
                .collect();
            if !components.is_empty() {
                return components;
            }
            debug!(breakdown = text, "Diamond breakdown yielded no components");
        }

        stone_weight
            .and_then(first_number)
            .filter(|w| *w > 0.0)
            .map(|weight| vec![DiamondComponent::new(weight, 1)])
            .unwrap_or_default()
    }

    fn parse_token(&self, token: &str) -> Option<DiamondComponent> {
        if let Some(caps) = EXPLICIT_PAIR.captures(token) {
            let left: f64 = caps.get(1)?.as_str().parse().ok()?;
            let right: f64 = caps.get(3)?.as_str().parse().ok()?;
            let left_is_carat = caps.get(2).is_some();
            let right_is_carat = caps.get(4).is_some();
            // A unit on the right marks it as the weight unless that
            // reading is impossible, then the written order stands.
            return if right_is_carat && !left_is_carat {
                component(right, left).or_else(|| component(left, right))
            } else {
                component(left, right)
            };
        }

        let numbers: Vec<f64> = all_numbers(token).into_iter().map(f64::abs).collect();
        match numbers.as_slice() {
            [weight] => component(*weight, 1.0),
            [a, b] => {
                if let Some(weight) = CARAT_WEIGHT
                    .captures(token)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                {
                    let count = if weight == *a { *b } else { *a };
                    return component(weight, count);
                }
                match self.mode {
                    BreakdownMode::Lenient => component(a.min(*b), a.max(*b)),
                    BreakdownMode::Strict => {
                        debug!(token, "Dropping ambiguous breakdown token");
                        None
                    }
                }
            }
            _ => {
                debug!(token, "Dropping unparseable breakdown token");
                None
            }
        }
    }
}

fn component(weight: f64, count: f64) -> Option<DiamondComponent> {
    let rounded = count.round();
    if weight.is_nan() || weight <= 0.0 || rounded < 1.0 || rounded > u32::MAX as f64 {
        return None;
    }
    if (count - rounded).abs() > 1e-6 {
        return None;
    }
    Some(DiamondComponent::new(weight, rounded as u32))
}

/// Parse with the default (lenient) policy
pub fn parse_diamond_breakdown(
    breakdown: Option<&str>,
    stone_weight: Option<&str>,
) -> Vec<DiamondComponent> {
    DiamondBreakdownParser::default().parse(breakdown, stone_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<DiamondComponent> {
        parse_diamond_breakdown(Some(text), None)
    }

    #[test]
    fn test_multi_stone_breakdown() {
        assert_eq!(
            parse("0.2 x 10, 1.5 x 2"),
            vec![
                DiamondComponent::new(0.2, 10),
                DiamondComponent::new(1.5, 2),
            ]
        );
    }

    #[test]
    fn test_separators_and_units() {
        assert_eq!(
            parse("0.05ct X 24; 1 ct × 1\n.1 * 6"),
            vec![
                DiamondComponent::new(0.05, 24),
                DiamondComponent::new(1.0, 1),
                DiamondComponent::new(0.1, 6),
            ]
        );
    }

    #[test]
    fn test_unit_on_right_marks_weight() {
        assert_eq!(parse("10 x 0.2ct"), vec![DiamondComponent::new(0.2, 10)]);
    }

    #[test]
    fn test_unit_on_count_keeps_written_order() {
        assert_eq!(parse("0.2 x 10 ct"), vec![DiamondComponent::new(0.2, 10)]);
        assert_eq!(parse("0.5 x 3 carats"), vec![DiamondComponent::new(0.5, 3)]);
    }

    #[test]
    fn test_single_number_is_one_stone() {
        assert_eq!(parse("1.25"), vec![DiamondComponent::new(1.25, 1)]);
    }

    #[test]
    fn test_bare_pair_uses_smaller_as_weight() {
        assert_eq!(parse("12 0.03"), vec![DiamondComponent::new(0.03, 12)]);
        assert_eq!(parse("0.3ct 4 stones"), vec![DiamondComponent::new(0.3, 4)]);
    }

    #[test]
    fn test_strict_mode_drops_ambiguous_pairs() {
        let parser = DiamondBreakdownParser::new(BreakdownMode::Strict);
        assert!(parser.parse(Some("12 0.03"), None).is_empty());
        assert_eq!(
            parser.parse(Some("12 stones 0.03ct"), None),
            vec![DiamondComponent::new(0.03, 12)]
        );
    }

    #[test]
    fn test_unparseable_tokens_are_dropped() {
        assert_eq!(
            parse("pave, 0.2 x 10, tbd, 1 2 3"),
            vec![DiamondComponent::new(0.2, 10)]
        );
        assert!(parse("0 x 5").is_empty());
        assert!(parse("0.2 x 0").is_empty());
    }

    #[test]
    fn test_stone_weight_fallback() {
        assert_eq!(
            parse_diamond_breakdown(None, Some("1.5")),
            vec![DiamondComponent::new(1.5, 1)]
        );
        assert_eq!(
            parse_diamond_breakdown(Some("n/a"), Some("0.7ct")),
            vec![DiamondComponent::new(0.7, 1)]
        );
        assert!(parse_diamond_breakdown(None, Some("0")).is_empty());
        assert!(parse_diamond_breakdown(None, None).is_empty());
    }

    #[test]
    fn test_breakdown_takes_precedence_over_stone_weight() {
        assert_eq!(
            parse_diamond_breakdown(Some("0.1 x 4"), Some("2")),
            vec![DiamondComponent::new(0.1, 4)]
        );
    }

    #[test]
    fn test_from_record() {
        let record = PricingInputRecord {
            diamond_breakdown: Some("  ".into()),
            stone_weight: Some("1.5".into()),
            ..Default::default()
        };
        assert_eq!(
            DiamondBreakdownParser::default().from_record(&record),
            vec![DiamondComponent::new(1.5, 1)]
        );
    }
}
