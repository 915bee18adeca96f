use core_config::TableCacheConfig;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::discount::resolve_discount_details;
use crate::engine::{PricingOutcome, price_option};
use crate::error::{PricingError, PricingResult};
use crate::models::{
    DiamondComponent, DiscountDetails, GradeOption, PricingInputRecord, PricingTables,
};
use crate::repository::{PricingTableRepository, load_tables};
use crate::request::{EstimateRequest, EstimateResponse};

struct CachedTables {
    tables: Arc<PricingTables>,
    loaded_at: Instant,
}

/// Price of one option in a multi-option request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionEstimate {
    pub clarity: String,
    pub color: String,
    #[serde(flatten)]
    pub outcome: PricingOutcome,
}

/// Caller-side pricing service: owns table loading and snapshot caching,
/// delegates the arithmetic to the engine.
#[derive(Clone)]
pub struct PricingService<R: PricingTableRepository> {
    repository: Arc<R>,
    cache_config: TableCacheConfig,
    cache: Arc<RwLock<Option<CachedTables>>>,
}

impl<R: PricingTableRepository> PricingService<R> {
    /// Create a new pricing service with the default snapshot TTL
    pub fn new(repository: R) -> Self {
        Self::with_cache_config(repository, TableCacheConfig::default())
    }

    pub fn with_cache_config(repository: R, cache_config: TableCacheConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            cache_config,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Current table snapshot, reloaded once the TTL has passed.
    ///
    /// Repository failures surface as `TableUnavailable` so callers can tell
    /// them apart from per-option pricing failures.
    pub async fn tables(&self) -> PricingResult<Arc<PricingTables>> {
        if self.cache_config.is_enabled() {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.loaded_at.elapsed() < self.cache_config.ttl {
                    return Ok(Arc::clone(&cached.tables));
                }
            }
        }

        let tables = Arc::new(load_tables(self.repository.as_ref()).await.map_err(|err| {
            warn!(error = %err, "Failed to load pricing tables");
            match err {
                PricingError::TableUnavailable(_) => err,
                other => PricingError::TableUnavailable(other.to_string()),
            }
        })?);

        if self.cache_config.is_enabled() {
            *self.cache.write().await = Some(CachedTables {
                tables: Arc::clone(&tables),
                loaded_at: Instant::now(),
            });
            debug!(
                ttl_secs = self.cache_config.ttl.as_secs(),
                "Cached pricing tables"
            );
        }

        Ok(tables)
    }

    /// Drop the cached snapshot so the next call reloads
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
        info!("Pricing table cache invalidated");
    }

    /// Discount that would apply to a record
    pub async fn discount_details(
        &self,
        record: &PricingInputRecord,
    ) -> PricingResult<DiscountDetails> {
        let tables = self.tables().await?;
        Ok(resolve_discount_details(&tables.cost_values, record))
    }

    /// Price the single option named by the request.
    ///
    /// Option failures (unmatched grade, malformed components) come back as
    /// `Ok` with `ok: false`; only table loading errors are `Err`.
    #[instrument(skip_all, fields(clarity = request.clarity(), color = request.color()))]
    pub async fn estimate(&self, request: EstimateRequest) -> PricingResult<EstimateResponse> {
        let tables = self.tables().await?;
        let record = request.to_record();
        let discount = resolve_discount_details(&tables.cost_values, &record);

        let result = request.diamond_components().and_then(|components| {
            price_option(
                &record,
                request.clarity(),
                request.color(),
                &tables,
                &discount,
                components.as_deref(),
            )
        });

        match result {
            Ok(priced) => {
                info!(
                    price = priced.price,
                    discount = discount.applied_percent,
                    "Estimated price"
                );
                Ok(EstimateResponse::priced(priced, &discount, request.wants_debug()))
            }
            Err(err) if err.is_option_failure() => {
                info!(error = %err, "Option could not be priced");
                Ok(EstimateResponse::failed(&err))
            }
            Err(err) => Err(err),
        }
    }

    /// Price several clarity/color options against one snapshot.
    ///
    /// Each option is independent: one missing grade does not affect the rest.
    /// The discount is returned with the estimates because it was resolved
    /// from the same snapshot.
    #[instrument(skip_all, fields(options = options.len()))]
    pub async fn estimate_options(
        &self,
        record: &PricingInputRecord,
        options: &[GradeOption],
        diamond_components: Option<&[DiamondComponent]>,
        include_debug: bool,
    ) -> PricingResult<(Vec<OptionEstimate>, DiscountDetails)> {
        let tables = self.tables().await?;
        let discount = resolve_discount_details(&tables.cost_values, record);

        let estimates: Vec<OptionEstimate> = options
            .iter()
            .map(|option| {
                let result = price_option(
                    record,
                    &option.clarity,
                    &option.color,
                    &tables,
                    &discount,
                    diamond_components,
                );
                OptionEstimate {
                    clarity: option.clarity.clone(),
                    color: option.color.clone(),
                    outcome: PricingOutcome::from_result(result, include_debug),
                }
            })
            .collect();

        let failed = estimates.iter().filter(|e| !e.outcome.ok).count();
        let priced = estimates.len() - failed;
        info!(priced, failed, "Estimated options");
        Ok((estimates, discount))
    }
}
