//! Ring configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Replica count used by `add(node)` when none is given.
pub const DEFAULT_REPLICAS: u32 = 100;

/// Tunables for a [`ConsistentHash`](crate::ConsistentHash).
///
/// With 100 replicas per node the standard deviation of the per-node load
/// stays around 10% of the mean for a ten node ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Number of points placed on the ring for a node added without an
    /// explicit replica count.
    pub default_replicas: u32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            default_replicas: DEFAULT_REPLICAS,
        }
    }
}

impl RingConfig {
    /// Create a configuration with the given default replica count.
    pub fn new(default_replicas: u32) -> Self {
        Self { default_replicas }
    }

    /// Parse and validate a JSON configuration. Missing fields take their
    /// default values.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: RingConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a usable ring.
    ///
    /// A default of zero replicas would turn every `add(node)` into a
    /// removal, so it is rejected.
    pub fn validate(&self) -> Result<()> {
        if self.default_replicas == 0 {
            return Err(Error::InvalidConfig(
                "default_replicas must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RingConfig::default();
        assert_eq!(config.default_replicas, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = RingConfig::from_json_str(r#"{"default_replicas": 16}"#).unwrap();
        assert_eq!(config, RingConfig::new(16));
    }

    #[test]
    fn test_from_json_missing_field_uses_default() {
        let config = RingConfig::from_json_str("{}").unwrap();
        assert_eq!(config.default_replicas, DEFAULT_REPLICAS);
    }

    #[test]
    fn test_zero_replicas_rejected() {
        let err = RingConfig::from_json_str(r#"{"default_replicas": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = RingConfig::from_json_str("{default_replicas").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_negative_replicas_rejected_by_parser() {
        assert!(RingConfig::from_json_str(r#"{"default_replicas": -1}"#).is_err());
    }
}
