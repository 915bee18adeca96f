use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::PricingResult;
use crate::models::{ClarityGroups, CostValues, DiamondPriceRow, PriceAdjustment, PricingTables};

/// Data-access interface for the pricing tables.
///
/// Implementations decide where tables live; the engine only ever sees the
/// loaded values. Load failures should be reported as
/// [`PricingError::TableUnavailable`](crate::PricingError::TableUnavailable).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PricingTableRepository: Send + Sync {
    /// Flat cost chart (metal prices, labour, margins, sizing bases)
    async fn load_cost_chart_values(&self) -> PricingResult<CostValues>;

    /// Graded diamond price rows
    async fn load_diamond_price_chart(&self) -> PricingResult<Vec<DiamondPriceRow>>;

    /// Optional clarity banding used as a lookup fallback
    async fn load_diamond_clarity_groups(&self) -> PricingResult<Option<ClarityGroups>>;

    /// Per-metal price adjustments
    async fn load_price_chart_adjustments(&self) -> PricingResult<Vec<PriceAdjustment>>;

    /// All four tables as one consistent snapshot.
    ///
    /// The default makes the four calls in turn. Stores that can read every
    /// table at once should override this so a snapshot never mixes versions.
    async fn load_snapshot(&self) -> PricingResult<PricingTables> {
        Ok(PricingTables {
            cost_values: self.load_cost_chart_values().await?,
            diamond_prices: self.load_diamond_price_chart().await?,
            clarity_groups: self.load_diamond_clarity_groups().await?,
            adjustments: self.load_price_chart_adjustments().await?,
        })
    }
}

/// Load one snapshot of all four tables
pub async fn load_tables<R: PricingTableRepository + ?Sized>(
    repository: &R,
) -> PricingResult<PricingTables> {
    let tables = repository.load_snapshot().await?;

    tracing::debug!(
        cost_keys = tables.cost_values.len(),
        diamond_rows = tables.diamond_prices.len(),
        has_clarity_groups = tables.clarity_groups.is_some(),
        adjustments = tables.adjustments.len(),
        "Loaded pricing tables"
    );

    Ok(tables)
}

/// In-memory implementation of PricingTableRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryPricingTables {
    tables: Arc<RwLock<PricingTables>>,
}

impl InMemoryPricingTables {
    pub fn new(tables: PricingTables) -> Self {
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Swap in a new snapshot; readers holding the old one are unaffected
    pub async fn replace(&self, tables: PricingTables) {
        *self.tables.write().await = tables;
        tracing::info!("Replaced in-memory pricing tables");
    }
}

#[async_trait]
impl PricingTableRepository for InMemoryPricingTables {
    async fn load_cost_chart_values(&self) -> PricingResult<CostValues> {
        Ok(self.tables.read().await.cost_values.clone())
    }

    async fn load_diamond_price_chart(&self) -> PricingResult<Vec<DiamondPriceRow>> {
        Ok(self.tables.read().await.diamond_prices.clone())
    }

    async fn load_diamond_clarity_groups(&self) -> PricingResult<Option<ClarityGroups>> {
        Ok(self.tables.read().await.clarity_groups.clone())
    }

    async fn load_price_chart_adjustments(&self) -> PricingResult<Vec<PriceAdjustment>> {
        Ok(self.tables.read().await.adjustments.clone())
    }

    async fn load_snapshot(&self) -> PricingResult<PricingTables> {
        Ok(self.tables.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_and_replace_tables() {
        let mut tables = PricingTables::default();
        tables.cost_values.insert("price_gram_18k", "50");
        let repo = InMemoryPricingTables::new(tables);

        let loaded = load_tables(&repo).await.unwrap();
        assert_eq!(loaded.cost_values.number("price_gram_18k"), 50.0);
        assert!(loaded.clarity_groups.is_none());

        let mut next = PricingTables::default();
        next.cost_values.insert("price_gram_18k", 55.0);
        repo.replace(next).await;

        let reloaded = load_tables(&repo).await.unwrap();
        assert_eq!(reloaded.cost_values.number("price_gram_18k"), 55.0);
        // The first snapshot is an independent copy
        assert_eq!(loaded.cost_values.number("price_gram_18k"), 50.0);
    }

    struct SplitTables;

    #[async_trait]
    impl PricingTableRepository for SplitTables {
        async fn load_cost_chart_values(&self) -> PricingResult<CostValues> {
            Ok([("labor_flat", "100")].into_iter().collect())
        }

        async fn load_diamond_price_chart(&self) -> PricingResult<Vec<DiamondPriceRow>> {
            Ok(vec![])
        }

        async fn load_diamond_clarity_groups(&self) -> PricingResult<Option<ClarityGroups>> {
            Ok(Some(ClarityGroups::new().with_group("SI", &["SI1", "SI2"])))
        }

        async fn load_price_chart_adjustments(&self) -> PricingResult<Vec<PriceAdjustment>> {
            Err(crate::PricingError::TableUnavailable("adjustments".into()))
        }
    }

    #[tokio::test]
    async fn test_default_snapshot_stops_at_first_failed_table() {
        let err = load_tables(&SplitTables).await.unwrap_err();
        assert_eq!(err.code(), "table_unavailable");
    }

    #[tokio::test]
    async fn test_mocked_snapshot_is_loaded_once() {
        let mut mock_repo = MockPricingTableRepository::new();
        mock_repo.expect_load_snapshot().times(1).returning(|| Ok(PricingTables::default()));

        let tables = load_tables(&mock_repo).await.unwrap();
        assert!(tables.diamond_prices.is_empty());
    }
}
