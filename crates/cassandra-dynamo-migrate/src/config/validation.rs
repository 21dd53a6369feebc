//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Upper bound on `retry.max_retries`; the backoff grows exponentially.
pub const MAX_RETRIES_LIMIT: u32 = 20;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.r#type != "cassandra" {
        return Err(MigrateError::Config(format!(
            "source.type must be 'cassandra', got '{}'",
            config.source.r#type
        )));
    }
    if config.source.endpoint.is_empty() {
        return Err(MigrateError::Config("source.endpoint is required".into()));
    }
    if config.source.keyspace.is_empty() {
        return Err(MigrateError::Config("source.keyspace is required".into()));
    }
    if config.source.table.is_empty() {
        return Err(MigrateError::Config("source.table is required".into()));
    }

    // Target validation
    if config.target.r#type != "dynamodb" {
        return Err(MigrateError::Config(format!(
            "target.type must be 'dynamodb', got '{}'",
            config.target.r#type
        )));
    }
    if config.target.endpoint.is_empty() {
        return Err(MigrateError::Config("target.endpoint is required".into()));
    }
    if config.target.region.is_empty() {
        return Err(MigrateError::Config("target.region is required".into()));
    }
    if config.target.table.is_empty() {
        return Err(MigrateError::Config("target.table is required".into()));
    }

    // Retry validation
    if config.retry.max_retries > MAX_RETRIES_LIMIT {
        return Err(MigrateError::Config(format!(
            "retry.max_retries must be at most {}, got {}",
            MAX_RETRIES_LIMIT, config.retry.max_retries
        )));
    }
    if config.retry.backoff_base == 0 {
        return Err(MigrateError::Config(
            "retry.backoff_base must be at least 1".into(),
        ));
    }
    if config.retry.backoff_unit_ms == 0 {
        return Err(MigrateError::Config(
            "retry.backoff_unit_ms must be at least 1".into(),
        ));
    }

    Ok(())
}
