//! Pricing Domain
//!
//! Cost-based price estimation for custom jewelry quotes. A quote is built
//! from metal weight and purity, diamond weights and grade, ring/bracelet/chain
//! size, labor, production overhead, shipping, tariffs, margins and discounts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Table snapshot caching, request handling
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Engine    │  ← Pure pricing pipeline (metal, diamonds, layers)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Cost table access (trait + in-memory implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Tables, input record, components, discounts
//! └─────────────┘
//! ```
//!
//! The engine never performs I/O: every call reads an immutable
//! [`PricingTables`] snapshot, so pricing the same record against the same
//! snapshot always yields the same result.

pub mod breakdown;
pub mod diamonds;
pub mod discount;
pub mod engine;
pub mod error;
pub mod layering;
pub mod metal;
pub mod models;
pub mod numeric;
pub mod repository;
pub mod request;
pub mod service;
pub mod sizing;

// Re-export commonly used types
pub use breakdown::{BreakdownMode, DiamondBreakdownParser, parse_diamond_breakdown};
pub use discount::{DiscountType, resolve_discount_details};
pub use engine::{
    PriceBreakdown, PricedOption, PricingOutcome, compute_option_price_from_costs, price_option,
};
pub use error::{PricingError, PricingResult};
pub use layering::{compute_labor_cost, compute_production_cost, compute_tariff_cost};
pub use metal::MetalKind;
pub use models::{
    AdjustmentKind, ClarityGroups, CostValues, DiamondComponent, DiamondPriceRow, DiscountDetails,
    GradeOption, PriceAdjustment, PricingInputRecord, PricingTables, SizeAdjustments,
};
pub use numeric::NumericValue;
pub use repository::{InMemoryPricingTables, PricingTableRepository, load_tables};
pub use request::{EstimateMeta, EstimateRequest, EstimateResponse};
pub use service::{OptionEstimate, PricingService};
pub use sizing::{SizeCategory, compute_size_adjustments};
