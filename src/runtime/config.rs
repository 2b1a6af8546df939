use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::sd::backoff::{self, RetryPolicy};

/// Client behavior configuration for one required service.
/// All timing values are in milliseconds.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientBehaviorConfig {
    /// Search attempts per unavailable period (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Settle delay before the first search (ms, default: 1000)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    /// Backoff multiplier, wait is `(2 << retry) * base` (ms, default: 1000)
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
}

impl Default for ClientBehaviorConfig {
    fn default() -> Self {
        ClientBehaviorConfig {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay(),
            backoff_base_ms: default_backoff_base(),
        }
    }
}

fn default_max_retries() -> u32 { backoff::DEFAULT_MAX_RETRIES }
fn default_initial_delay() -> u64 { backoff::DEFAULT_INITIAL_DELAY.as_millis() as u64 }
fn default_backoff_base() -> u64 { backoff::DEFAULT_BACKOFF_BASE.as_millis() as u64 }

impl ClientBehaviorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl From<&ClientBehaviorConfig> for RetryPolicy {
    fn from(config: &ClientBehaviorConfig) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ClientBehaviorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ClientBehaviorConfig::default());
        assert_eq!(RetryPolicy::from(&config), RetryPolicy::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ClientBehaviorConfig::from_json_str(r#"{ "max_retries": 5, "backoff_base_ms": 100 }"#).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_delay_ms, 1000);

        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.next_interval(1), Duration::from_millis(400));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = ClientBehaviorConfig::from_json_str(r#"{ "max_retries": "three" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ClientBehaviorConfig::load("/nonexistent/client_behavior.json").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("client_behavior.json")),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
