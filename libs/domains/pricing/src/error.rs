use thiserror::Error;

/// Result type for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur while quoting a piece
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// No diamond chart row (direct or via clarity group) covers the option
    #[error("No diamond price for clarity '{clarity}', color '{color}' at {weight}ct")]
    MissingGrade {
        clarity: String,
        color: String,
        weight: f64,
    },

    /// A primary cost driver is malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The caller could not load one of the cost tables
    #[error("Pricing table unavailable: {0}")]
    TableUnavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PricingError {
    /// Short machine-readable code, stable across message wording changes
    pub fn code(&self) -> &'static str {
        match self {
            PricingError::MissingGrade { .. } => "missing_grade",
            PricingError::InvalidInput(_) => "invalid_input",
            PricingError::TableUnavailable(_) => "table_unavailable",
            PricingError::Internal(_) => "internal",
        }
    }

    /// Whether this failure belongs to a single option rather than the whole request
    pub fn is_option_failure(&self) -> bool {
        matches!(
            self,
            PricingError::MissingGrade { .. } | PricingError::InvalidInput(_)
        )
    }
}
