//! # cassandra-dynamo-migrate
//!
//! Cassandra to DynamoDB table migration library.
//!
//! A run reads every row of one Cassandra table and upserts each row into a
//! DynamoDB table, with:
//!
//! - **Bounded exponential backoff** around every connect, read and write
//! - **Idempotent writes**: each record is an unconditional upsert keyed by `id`
//! - **Fail-fast escalation**: the first operation to exhaust its retries ends the run
//!
//! ## Example
//!
//! ```rust,no_run
//! use cassandra_dynamo_migrate::{Config, Orchestrator};
//! use cassandra_dynamo_migrate::drivers::{MemorySource, MemoryTarget};
//!
//! #[tokio::main]
//! async fn main() -> cassandra_dynamo_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let orchestrator = Orchestrator::new(config, MemorySource::default(), MemoryTarget::new());
//!     let result = orchestrator.run().await?;
//!     println!("Migrated {} records", result.records_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod retry;

// Re-exports for convenient access
pub use config::{Config, RetryConfig, SourceConfig, TargetConfig};
pub use core::{Record, RecordStream, SourceReader, SourceSeeder, TargetWriter};
pub use error::{MigrateError, Result, Stage};
pub use orchestrator::{HealthCheckResult, MigrationResult, Orchestrator};
pub use retry::{RetryExecutor, RetryPolicy, Sleeper, TokioSleeper};
