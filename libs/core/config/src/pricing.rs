use crate::{env_parse, ConfigError, FromEnv};
use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 300;

/// How long a loaded pricing table snapshot may be reused
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableCacheConfig {
    pub ttl: Duration,
}

impl TableCacheConfig {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Reload the tables on every request
    pub fn disabled() -> Self {
        Self {
            ttl: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }
}

impl FromEnv for TableCacheConfig {
    /// - PRICING_TABLE_TTL_SECS: defaults to 300, 0 disables caching
    fn from_env() -> Result<Self, ConfigError> {
        let secs = env_parse("PRICING_TABLE_TTL_SECS", DEFAULT_TTL_SECS)?;
        Ok(Self::new(Duration::from_secs(secs)))
    }
}

impl Default for TableCacheConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_cache_defaults() {
        temp_env::with_var_unset("PRICING_TABLE_TTL_SECS", || {
            let config = TableCacheConfig::from_env().unwrap();
            assert_eq!(config.ttl, Duration::from_secs(300));
            assert!(config.is_enabled());
        });
    }

    #[test]
    fn test_table_cache_zero_disables() {
        temp_env::with_var("PRICING_TABLE_TTL_SECS", Some("0"), || {
            let config = TableCacheConfig::from_env().unwrap();
            assert!(!config.is_enabled());
            assert_eq!(config, TableCacheConfig::disabled());
        });
    }

    #[test]
    fn test_table_cache_invalid_ttl() {
        temp_env::with_var("PRICING_TABLE_TTL_SECS", Some("-1"), || {
            let err = TableCacheConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PRICING_TABLE_TTL_SECS"));
        });
    }
}
