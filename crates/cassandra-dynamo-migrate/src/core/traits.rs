//! Core traits for store-agnostic record migration.
//!
//! This module defines the two boundaries the migration driver talks to:
//!
//! - [`SourceReader`]: Opens a session against the source store and yields records
//! - [`TargetWriter`]: Opens a session against the target store and upserts records
//! - [`SourceSeeder`]: Inserts sample records into the source (test data only)
//!
//! Sessions are associated types: each driver decides what an open connection
//! looks like, and the driver holds it for the lifetime of a run.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;

use crate::error::Result;

use super::record::Record;

/// Lazy, forward-only, non-restartable sequence of records.
///
/// An `Err` item ends the sequence; a cursor that fails to close surfaces
/// as a final `Err` item rather than being dropped.
pub type RecordStream<'a> = BoxStream<'a, Result<Record>>;

/// Read records from a source store.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Open connection handle, reused by every read.
    type Session: Send + Sync;

    /// Open a session against the source store.
    ///
    /// Fails with [`MigrateError::Connection`](crate::MigrateError::Connection).
    async fn connect(&self) -> Result<Self::Session>;

    /// Enumerate every row of the source table in cursor order.
    ///
    /// Order is whatever the store yields and is not stable across runs.
    fn scan<'a>(&'a self, session: &'a Self::Session) -> RecordStream<'a>;

    /// Materialize the full table.
    ///
    /// Any failed item, including a failed cursor close, fails the whole read
    /// with [`MigrateError::Query`](crate::MigrateError::Query).
    async fn read_all(&self, session: &Self::Session) -> Result<Vec<Record>> {
        self.scan(session).try_collect().await
    }

    /// Get the store type identifier (e.g., "cassandra").
    fn db_type(&self) -> &str;

    /// Human-readable location of the source table, for log lines.
    fn describe(&self) -> String;
}

/// Write records to a target store.
#[async_trait]
pub trait TargetWriter: Send + Sync {
    /// Open connection handle, reused by every write.
    type Session: Send + Sync;

    /// Open a session against the target store.
    async fn connect(&self) -> Result<Self::Session>;

    /// Upsert one record keyed by its id.
    ///
    /// Overwrites any existing item with the same id; there is no existence
    /// check and no "already exists" signal.
    async fn write_one(&self, session: &Self::Session, record: &Record) -> Result<()>;

    /// Get the store type identifier (e.g., "dynamodb").
    fn db_type(&self) -> &str;

    /// Human-readable location of the target table, for log lines.
    fn describe(&self) -> String;
}

/// Insert records into a source store.
#[async_trait]
pub trait SourceSeeder: SourceReader {
    async fn insert(&self, session: &Self::Session, record: &Record) -> Result<()>;
}
