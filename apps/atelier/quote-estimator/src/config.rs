//! Configuration for the quote estimator

use core_config::{FromEnv, TableCacheConfig, env_or_default, env_parse};
use eyre::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON snapshot holding cost values, diamond chart, clarity groups and adjustments
    pub tables_path: PathBuf,
    /// Print Prometheus metrics to stderr after each command
    pub metrics_enabled: bool,
    pub table_cache: TableCacheConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            tables_path: PathBuf::from(env_or_default(
                "PRICING_TABLES_PATH",
                "pricing-tables.json",
            )),
            metrics_enabled: env_parse("PRICING_METRICS", false)?,
            table_cache: TableCacheConfig::from_env()?,
        })
    }
}
