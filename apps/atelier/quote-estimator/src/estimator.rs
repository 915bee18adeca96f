//! Quote Estimator
//!
//! Runs estimate commands against the pricing service and records metrics
//! for every option priced.

use domain_pricing::{
    DiscountDetails, EstimateMeta, EstimateRequest, EstimateResponse, GradeOption,
    OptionEstimate, PricingOutcome, PricingService, PricingTableRepository,
};
use eyre::Result;
use observability::{QuoteMetrics, QuoteTimer};
use serde::Serialize;
use tracing::{info, warn};

/// Result of pricing several options for one piece
#[derive(Debug, Clone, Serialize)]
pub struct OptionsReport {
    pub options: Vec<OptionEstimate>,
    pub meta: EstimateMeta,
}

pub struct QuoteEstimator<R: PricingTableRepository> {
    service: PricingService<R>,
}

impl<R: PricingTableRepository> QuoteEstimator<R> {
    pub fn new(service: PricingService<R>) -> Self {
        Self { service }
    }

    /// Price the clarity/color named in the request
    pub async fn estimate(&self, request: EstimateRequest) -> Result<EstimateResponse> {
        let _timer = QuoteTimer::new("estimate");
        let clarity = request.clarity().to_string();
        let color = request.color().to_string();

        let response = self.service.estimate(request).await?;
        record_outcome(&clarity, &color, response.price, response.code);

        Ok(response)
    }

    /// Price every option against the same piece
    pub async fn options(
        &self,
        request: EstimateRequest,
        options: &[GradeOption],
        include_debug: bool,
    ) -> Result<OptionsReport> {
        let _timer = QuoteTimer::new("options");
        let record = request.to_record();

        let (estimates, discount) = match request.diamond_components() {
            Ok(components) => {
                self.service
                    .estimate_options(&record, options, components.as_deref(), include_debug)
                    .await?
            }
            Err(err) => {
                warn!(error = %err, "Rejected diamond components for every option");
                let failed = options
                    .iter()
                    .map(|option| OptionEstimate {
                        clarity: option.clarity.clone(),
                        color: option.color.clone(),
                        outcome: PricingOutcome::from_result(Err(err.clone()), false),
                    })
                    .collect();
                (failed, self.service.discount_details(&record).await?)
            }
        };

        for estimate in &estimates {
            record_outcome(
                &estimate.clarity,
                &estimate.color,
                estimate.outcome.price,
                estimate.outcome.code,
            );
        }

        info!(
            options = estimates.len(),
            discount = %discount.summary,
            "Priced options"
        );

        Ok(OptionsReport {
            options: estimates,
            meta: meta(&discount),
        })
    }

    /// Discount that applies to the request, without pricing it
    pub async fn discount(&self, request: &EstimateRequest) -> Result<DiscountDetails> {
        Ok(self.service.discount_details(&request.to_record()).await?)
    }
}

fn record_outcome(clarity: &str, color: &str, price: Option<i64>, code: Option<&'static str>) {
    match (price, code) {
        (Some(price), _) => QuoteMetrics::record_option_priced(clarity, color, price),
        (None, code) => QuoteMetrics::record_option_failed(code.unwrap_or("unknown")),
    }
}

fn meta(discount: &DiscountDetails) -> EstimateMeta {
    EstimateMeta {
        discount_summary: discount.summary.clone(),
        discount_percent: discount.applied_percent,
    }
}
