//! Observability utilities for quote pricing.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Quote metrics: options priced and failed, estimate latency, last price
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, render_metrics, QuoteMetrics, QuoteTimer};
//!
//! init_metrics();
//!
//! let timer = QuoteTimer::new("estimate");
//! QuoteMetrics::record_option_priced("VS1", "F", 2516);
//! drop(timer);
//!
//! println!("{}", render_metrics());
//! ```

pub mod quote;

pub use quote::{QuoteMetrics, QuoteTimer};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// This should be called once at application startup.
/// Returns the PrometheusHandle for rendering metrics.
pub fn init_metrics() -> &'static PrometheusHandle {
    METRICS_HANDLE.get_or_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        info!("Prometheus metrics recorder initialized");

        register_metric_descriptions();

        handle
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Prometheus text exposition of everything recorded so far
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

/// Register metric descriptions for documentation
fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_gauge;
    use metrics::describe_histogram;

    describe_counter!(
        "quote_options_priced_total",
        "Clarity/color options priced successfully"
    );
    describe_counter!(
        "quote_options_failed_total",
        "Clarity/color options that could not be priced, by reason"
    );
    describe_histogram!(
        "quote_estimate_duration_seconds",
        "Quote estimate duration in seconds"
    );
    describe_gauge!(
        "quote_last_price_usd",
        "Most recent quoted price in whole dollars"
    );
    describe_counter!(
        "pricing_table_loads_total",
        "Pricing table snapshot loads by status"
    );
}
