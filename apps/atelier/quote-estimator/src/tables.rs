//! Pricing tables read from a JSON snapshot on disk

use async_trait::async_trait;
use domain_pricing::{
    ClarityGroups, CostValues, DiamondPriceRow, PriceAdjustment, PricingError, PricingResult,
    PricingTableRepository, PricingTables,
};
use observability::QuoteMetrics;
use std::path::PathBuf;
use tracing::debug;

/// File-backed [`PricingTableRepository`].
///
/// A snapshot is one read of the file, so edits are picked up once the
/// service's cached snapshot expires and never land halfway through a load.
#[derive(Debug, Clone)]
pub struct JsonFileTables {
    path: PathBuf,
}

impl JsonFileTables {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, err: impl std::fmt::Display) -> PricingError {
        PricingError::TableUnavailable(format!("{}: {err}", self.path.display()))
    }

    async fn read(&self) -> PricingResult<PricingTables> {
        let result = self.read_file().await;
        QuoteMetrics::record_table_load(result.is_ok());
        result
    }

    async fn read_file(&self) -> PricingResult<PricingTables> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| self.unavailable(e))?;
        let tables: PricingTables = serde_json::from_str(&raw).map_err(|e| self.unavailable(e))?;
        debug!(path = %self.path.display(), "Read pricing tables file");
        Ok(tables)
    }
}

#[async_trait]
impl PricingTableRepository for JsonFileTables {
    async fn load_cost_chart_values(&self) -> PricingResult<CostValues> {
        Ok(self.read().await?.cost_values)
    }

    async fn load_diamond_price_chart(&self) -> PricingResult<Vec<DiamondPriceRow>> {
        Ok(self.read().await?.diamond_prices)
    }

    async fn load_diamond_clarity_groups(&self) -> PricingResult<Option<ClarityGroups>> {
        Ok(self.read().await?.clarity_groups)
    }

    async fn load_price_chart_adjustments(&self) -> PricingResult<Vec<PriceAdjustment>> {
        Ok(self.read().await?.adjustments)
    }

    async fn load_snapshot(&self) -> PricingResult<PricingTables> {
        self.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_pricing::load_tables;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "cost_values": { "price_gram_18k": "50", "labor_flat": 100 },
        "diamond_prices": [
            { "clarity": "VS1", "color": "F", "weightMin": 0, "weightMax": 2, "pricePerCt": 3000 }
        ],
        "clarity_groups": { "VS": ["VS1", "VS2"] },
        "adjustments": [{ "metal": "14k", "value": 0.05 }]
    }"#;

    #[tokio::test]
    async fn test_loads_snapshot_with_string_and_number_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let tables = JsonFileTables::new(file.path());
        let cost_values = tables.load_cost_chart_values().await.unwrap();
        assert_eq!(cost_values.number("price_gram_18k"), 50.0);
        assert_eq!(cost_values.number("labor_flat"), 100.0);
        assert_eq!(tables.load_diamond_price_chart().await.unwrap().len(), 1);
        assert!(tables.load_diamond_clarity_groups().await.unwrap().is_some());
        let adjustments = tables.load_price_chart_adjustments().await.unwrap();
        assert_eq!(adjustments.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_comes_from_a_single_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(&path, SNAPSHOT).unwrap();
        let tables = JsonFileTables::new(&path);

        let snapshot = load_tables(&tables).await.unwrap();
        std::fs::write(&path, "{}").unwrap();

        assert_eq!(snapshot.cost_values.number("price_gram_18k"), 50.0);
        assert_eq!(snapshot.diamond_prices.len(), 1);
        assert!(snapshot.clarity_groups.is_some());
        assert_eq!(snapshot.adjustments.len(), 1);

        let rewritten = load_tables(&tables).await.unwrap();
        assert!(rewritten.cost_values.is_empty());
        assert!(rewritten.diamond_prices.is_empty());
    }

    #[tokio::test]
    async fn test_loads_are_counted_by_status() {
        observability::init_metrics();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        JsonFileTables::new(&path).load_snapshot().await.unwrap();
        JsonFileTables::new(dir.path().join("absent.json"))
            .load_snapshot()
            .await
            .unwrap_err();

        let rendered = observability::render_metrics();
        assert!(rendered.contains(r#"pricing_table_loads_total{status="ok"}"#));
        assert!(rendered.contains(r#"pricing_table_loads_total{status="error"}"#));
    }

    #[tokio::test]
    async fn test_missing_file_is_table_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let tables = JsonFileTables::new(dir.path().join("absent.json"));

        let err = tables.load_cost_chart_values().await.unwrap_err();
        assert_eq!(err.code(), "table_unavailable");
        assert!(err.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn test_malformed_file_is_table_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = JsonFileTables::new(file.path())
            .load_diamond_price_chart()
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::TableUnavailable(_)));
    }
}
