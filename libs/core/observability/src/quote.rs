//! Quote pricing metrics.

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Quote metrics recorder
pub struct QuoteMetrics;

impl QuoteMetrics {
    /// Record one successfully priced option
    pub fn record_option_priced(clarity: &str, color: &str, price: i64) {
        counter!(
            "quote_options_priced_total",
            "clarity" => clarity.to_string(),
            "color" => color.to_string()
        )
        .increment(1);
        gauge!("quote_last_price_usd").set(price as f64);

        tracing::debug!(clarity, color, price, "Recorded priced option");
    }

    /// Record an option that could not be priced; `reason` is the error code
    pub fn record_option_failed(reason: &str) {
        counter!("quote_options_failed_total", "reason" => reason.to_string()).increment(1);
    }

    pub fn record_table_load(success: bool) {
        let status = if success { "ok" } else { "error" };
        counter!("pricing_table_loads_total", "status" => status).increment(1);
    }
}

/// Timer guard for automatic duration recording.
///
/// Records the duration when `stop()` is called or when dropped.
pub struct QuoteTimer {
    start: Instant,
    command: String,
    stopped: bool,
}

impl QuoteTimer {
    /// Start a new timer for a command ("estimate", "options", ...)
    pub fn new(command: &str) -> Self {
        Self {
            start: Instant::now(),
            command: command.to_string(),
            stopped: false,
        }
    }

    /// Stop the timer and record the duration. Returns duration in milliseconds.
    pub fn stop(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        let duration = self.start.elapsed();
        histogram!("quote_estimate_duration_seconds", "command" => self.command.clone())
            .record(duration.as_secs_f64());

        duration.as_millis() as u64
    }
}

impl Drop for QuoteTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_once() {
        let mut timer = QuoteTimer::new("estimate");
        timer.stop();
        assert!(timer.stopped);
        assert_eq!(timer.stop(), 0);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        QuoteMetrics::record_option_priced("VS1", "F", 100);
        QuoteMetrics::record_option_failed("invalid_input");
        QuoteMetrics::record_table_load(false);
    }
}
