//! Migration orchestrator - main workflow coordinator.
//!
//! A run moves through four phases, each call gated by the retry executor:
//!
//! ```text
//! ConnectSource -> ReadAll -> ConnectTarget -> WriteLoop(0..N) -> Done
//!       |             |             |                |
//!       +-------------+------+------+----------------+
//!                            v
//!                          Fatal (first exhausted retry budget)
//! ```
//!
//! There is no backward transition. Records written before a fatal write
//! failure stay written; nothing is rolled back and no resume marker is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info};

use crate::config::Config;
use crate::core::{Record, SourceReader, SourceSeeder, TargetWriter};
use crate::error::{Result, Stage};
use crate::retry::RetryExecutor;

/// Records between progress log lines.
const PROGRESS_LOG_INTERVAL: usize = 10_000;

/// Migration orchestrator.
pub struct Orchestrator<S, T> {
    config: Config,
    source: S,
    target: T,
    retry: RetryExecutor,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status.
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Records read from the source.
    pub records_read: usize,

    /// Records upserted into the target.
    pub records_written: usize,

    /// Average throughput (records/second).
    pub records_per_second: i64,
}

impl MigrationResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Connectivity report for both stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub source_connected: bool,
    pub source_latency_ms: u64,
    pub source_error: Option<String>,
    pub target_connected: bool,
    pub target_latency_ms: u64,
    pub target_error: Option<String>,
    pub healthy: bool,
}

impl<S, T> Orchestrator<S, T>
where
    S: SourceReader,
    T: TargetWriter,
{
    /// Create a new orchestrator; retries follow `config.retry`.
    pub fn new(config: Config, source: S, target: T) -> Self {
        let retry = RetryExecutor::new(config.retry.policy());
        Self {
            config,
            source,
            target,
            retry,
        }
    }

    /// Replace the retry executor (custom sleeper or error predicate).
    pub fn with_retry_executor(mut self, retry: RetryExecutor) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the migration.
    ///
    /// Fails with `RetryExhausted` naming the first stage that ran out of
    /// attempts.
    pub async fn run(&self) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting migration run: {}", run_id);

        info!("Phase 1: Connecting to source ({})", self.source.describe());
        let source_session = self
            .retry
            .execute(Stage::ConnectSource, || self.source.connect())
            .await?;

        info!("Phase 2: Reading all records from source");
        let records = self
            .retry
            .execute(Stage::Read, || self.source.read_all(&source_session))
            .await?;
        info!("Read {} records from {}", records.len(), self.source.db_type());

        info!("Phase 3: Connecting to target ({})", self.target.describe());
        let target_session = self
            .retry
            .execute(Stage::ConnectTarget, || self.target.connect())
            .await?;

        info!("Phase 4: Writing {} records", records.len());
        let records_written = self.write_all(&target_session, &records).await?;

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let records_per_second = if duration > 0.0 {
            (records_written as f64 / duration) as i64
        } else {
            0
        };

        let result = MigrationResult {
            run_id,
            status: "completed".to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            records_read: records.len(),
            records_written,
            records_per_second,
        };

        info!(
            "Migration {}: {} records in {:.1}s ({} records/s)",
            result.status, result.records_written, result.duration_seconds, result.records_per_second
        );

        Ok(result)
    }

    /// Upsert records one at a time in source order, stopping at the first
    /// record that exhausts its retries.
    async fn write_all(&self, session: &T::Session, records: &[Record]) -> Result<usize> {
        let total = records.len();

        for (written, record) in records.iter().enumerate() {
            let outcome = self
                .retry
                .execute(Stage::Write, || self.target.write_one(session, record))
                .await;

            if let Err(e) = outcome {
                error!(
                    "Migration aborted at record {}: {} of {} records written",
                    record.id(),
                    written,
                    total
                );
                return Err(e);
            }

            let done = written + 1;
            if done % PROGRESS_LOG_INTERVAL == 0 {
                info!("Progress: {}/{} records written", done, total);
            }
        }

        Ok(total)
    }

    /// Connect to both stores once, without retries.
    pub async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let source = self.source.connect().await;
        let source_latency_ms = start.elapsed().as_millis() as u64;

        let start = Instant::now();
        let target = self.target.connect().await;
        let target_latency_ms = start.elapsed().as_millis() as u64;

        let source_error = source.err().map(|e| e.to_string());
        let target_error = target.err().map(|e| e.to_string());
        let healthy = source_error.is_none() && target_error.is_none();

        HealthCheckResult {
            source_connected: source_error.is_none(),
            source_latency_ms,
            source_error,
            target_connected: target_error.is_none(),
            target_latency_ms,
            target_error,
            healthy,
        }
    }
}

impl<S, T> Orchestrator<S, T>
where
    S: SourceSeeder,
    T: TargetWriter,
{
    /// Populate the source table with `count` sample records.
    pub async fn seed(&self, count: u64) -> Result<u64> {
        info!("Seeding {} sample records into {}", count, self.source.describe());
        let session = self
            .retry
            .execute(Stage::ConnectSource, || self.source.connect())
            .await?;

        for index in 0..count {
            let record = Record::sample(index);
            self.retry
                .execute(Stage::Seed, || self.source.insert(&session, &record))
                .await?;

            let done = index + 1;
            if done % PROGRESS_LOG_INTERVAL as u64 == 0 {
                info!("Progress: {}/{} sample records inserted", done, count);
            }
        }

        info!("Finished inserting {} sample records", count);
        Ok(count)
    }
}
