//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;
pub use validation::MAX_RETRIES_LIMIT;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults_match_local_endpoints() {
        let config = Config::default();
        assert_eq!(config.source.endpoint, "127.0.0.1:9042");
        assert_eq!(config.source.keyspace, "test");
        assert_eq!(config.source.table, "users");
        assert_eq!(config.target.endpoint, "http://localhost:8000");
        assert_eq!(config.target.region, "us-west-2");
        assert_eq!(config.target.table, "UsersTable");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.backoff_base, 2);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
source:
  endpoint: cassandra.internal:9042
  keyspace: prod
target:
  table: Users
retry:
  max_retries: 3
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.source.endpoint, "cassandra.internal:9042");
        assert_eq!(config.source.keyspace, "prod");
        assert_eq!(config.source.table, "users");
        assert_eq!(config.target.table, "Users");
        assert_eq!(config.target.region, "us-west-2");
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.backoff_unit_ms, 1000);
    }

    #[test]
    fn test_from_yaml_rejects_invalid_values() {
        let yaml = "source:\n  type: mssql\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_retry_section_builds_policy() {
        let yaml = "retry:\n  max_retries: 2\n  backoff_base: 3\n  backoff_unit_ms: 10\n";
        let policy = Config::from_yaml(yaml).unwrap().retry.policy();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(0), Duration::from_millis(10));
        assert_eq!(policy.backoff(2), Duration::from_millis(90));
    }
}
