//! Lenient number handling for table values and request fields.
//!
//! Table values and request fields arrive as strings (or JSON numbers) and
//! must never crash a calculation: anything that does not read as a finite
//! number is treated as absent.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?(?:\d+(?:\.\d*)?|\.\d+)").expect("valid number regex"));

/// A value that may be stored either as a JSON number or as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    /// Strict reading: the whole value must be a finite number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericValue::Number(n) => n.is_finite().then_some(*n),
            NumericValue::Text(s) => parse_number(s),
        }
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Number(value)
    }
}

impl From<&str> for NumericValue {
    fn from(value: &str) -> Self {
        NumericValue::Text(value.to_string())
    }
}

impl From<String> for NumericValue {
    fn from(value: String) -> Self {
        NumericValue::Text(value)
    }
}

/// Parse a trimmed string as a finite number. Empty or non-numeric input is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Extract the first number embedded in free text ("10 g", "US 7.5", "18in").
pub fn first_number(raw: &str) -> Option<f64> {
    if let Some(n) = parse_number(raw) {
        return Some(n);
    }
    FIRST_NUMBER
        .find(raw)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Every number embedded in free text, in order of appearance.
pub fn all_numbers(raw: &str) -> Vec<f64> {
    FIRST_NUMBER
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_first_number_reads_units() {
        assert_eq!(first_number("10 g"), Some(10.0));
        assert_eq!(first_number("US 7.5"), Some(7.5));
        assert_eq!(first_number("18in"), Some(18.0));
        assert_eq!(first_number("-0.5"), Some(-0.5));
        assert_eq!(first_number("n/a"), None);
    }

    #[test]
    fn test_numeric_value_from_json() {
        let number: NumericValue = serde_json::from_str("50").unwrap();
        let text: NumericValue = serde_json::from_str("\"0.1\"").unwrap();
        let junk: NumericValue = serde_json::from_str("\"tbd\"").unwrap();
        assert_eq!(number.as_f64(), Some(50.0));
        assert_eq!(text.as_f64(), Some(0.1));
        assert_eq!(junk.as_f64(), None);
    }
}
