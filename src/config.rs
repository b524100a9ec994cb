//! Node-level configuration of the transaction core.
//!
//! Every field has a default, so a config file only needs the values it changes:
//!
//! ```json
//! { "max_decompressed_size": 524288, "fee": { "multipliers": { "1": 15000 } } }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::compression::{BoundedDecompressor, DEFAULT_MAX_DECOMPRESSED_SIZE};
use crate::core::fee::FeeSchedule;
use crate::core::recovery_cache::{RecoveryCache, DEFAULT_RECOVERY_CACHE_CAPACITY};
use crate::error::{ChainError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Ceiling on the decompressed size of each packed blob, in bytes
    pub max_decompressed_size: usize,
    /// Number of signature recoveries kept in memory
    pub recovery_cache_capacity: usize,
    pub fee: FeeSchedule,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            recovery_cache_capacity: DEFAULT_RECOVERY_CACHE_CAPACITY,
            fee: FeeSchedule::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ChainError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ChainError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_decompressed_size == 0 {
            return Err(ChainError::Config("max_decompressed_size must be greater than 0".to_string()));
        }
        if self.recovery_cache_capacity == 0 {
            return Err(ChainError::Config("recovery_cache_capacity must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn decompressor(&self) -> BoundedDecompressor {
        BoundedDecompressor::new(self.max_decompressed_size)
    }

    pub fn recovery_cache(&self) -> RecoveryCache {
        RecoveryCache::new(self.recovery_cache_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fee::Amount;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.max_decompressed_size, 1024 * 1024);
        assert_eq!(config.recovery_cache_capacity, 100_000);
        assert_eq!(config.decompressor().limit(), 1024 * 1024);
    }

    #[test]
    fn test_partial_json() {
        let config = CoreConfig::from_json_str(
            r#"{ "recovery_cache_capacity": 10, "fee": { "base_fee_per_action": 5, "multipliers": { "2": 30000 } } }"#,
        )
        .unwrap();
        assert_eq!(config.recovery_cache_capacity, 10);
        assert_eq!(config.max_decompressed_size, DEFAULT_MAX_DECOMPRESSED_SIZE);
        assert_eq!(config.fee.base_fee_per_action, Amount::new(5));
        assert_eq!(config.fee.scale(2), 30_000);
        assert_eq!(config.recovery_cache().capacity(), 10);
    }

    #[test]
    fn test_rejects_zero_limits_and_unknown_fields() {
        assert!(CoreConfig::from_json_str(r#"{ "max_decompressed_size": 0 }"#).is_err());
        assert!(CoreConfig::from_json_str(r#"{ "recovery_cache_capacity": 0 }"#).is_err());
        assert!(CoreConfig::from_json_str(r#"{ "bogus": 1 }"#).is_err());
    }
}
