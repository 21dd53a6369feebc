//! Configuration type definitions.
//!
//! Every field has a default so a missing config file (or a partial one)
//! migrates between the local development endpoints.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Source store configuration (Cassandra).
    #[serde(default)]
    pub source: SourceConfig,

    /// Target store configuration (DynamoDB).
    #[serde(default)]
    pub target: TargetConfig,

    /// Retry behavior for every externally-facing operation.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Source store (Cassandra) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Store type (always "cassandra" for now).
    #[serde(default = "default_cassandra")]
    pub r#type: String,

    /// Contact point, `host:port` (default: 127.0.0.1:9042).
    #[serde(default = "default_source_endpoint")]
    pub endpoint: String,

    /// Keyspace holding the source table (default: "test").
    #[serde(default = "default_keyspace")]
    pub keyspace: String,

    /// Source table (default: "users").
    #[serde(default = "default_source_table")]
    pub table: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            r#type: default_cassandra(),
            endpoint: default_source_endpoint(),
            keyspace: default_keyspace(),
            table: default_source_table(),
        }
    }
}

/// Target store (DynamoDB) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Store type (always "dynamodb" for now).
    #[serde(default = "default_dynamodb")]
    pub r#type: String,

    /// Endpoint URL (default: DynamoDB Local on http://localhost:8000).
    #[serde(default = "default_target_endpoint")]
    pub endpoint: String,

    /// AWS region (default: "us-west-2").
    #[serde(default = "default_region")]
    pub region: String,

    /// Target table (default: "UsersTable").
    #[serde(default = "default_target_table")]
    pub table: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            r#type: default_dynamodb(),
            endpoint: default_target_endpoint(),
            region: default_region(),
            table: default_target_table(),
        }
    }
}

/// Retry configuration applied to connect, read and per-record write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (default: 5, so 6 attempts total).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Exponential base of the backoff schedule (default: 2).
    #[serde(default = "default_backoff_base")]
    pub backoff_base: u32,

    /// Length of one backoff unit in milliseconds (default: 1000).
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base: default_backoff_base(),
            backoff_unit_ms: default_backoff_unit_ms(),
        }
    }
}

impl RetryConfig {
    /// Build the retry policy described by this section.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            self.backoff_base,
            Duration::from_millis(self.backoff_unit_ms),
        )
    }
}

fn default_cassandra() -> String {
    "cassandra".to_string()
}

fn default_source_endpoint() -> String {
    "127.0.0.1:9042".to_string()
}

fn default_keyspace() -> String {
    "test".to_string()
}

fn default_source_table() -> String {
    "users".to_string()
}

fn default_dynamodb() -> String {
    "dynamodb".to_string()
}

fn default_target_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_region() -> String {
    "us-west-2".to_string()
}

fn default_target_table() -> String {
    "UsersTable".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_base() -> u32 {
    2
}

fn default_backoff_unit_ms() -> u64 {
    1000
}
