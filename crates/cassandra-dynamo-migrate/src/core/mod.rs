//! Core abstractions for store-agnostic migration.
//!
//! - [`record`]: The migrated entity
//! - [`traits`]: Source and target store boundaries
//!
//! Driver modules (`drivers/cassandra`, `drivers/dynamodb`, `drivers/memory`)
//! implement these traits; the orchestrator only ever sees the traits.

pub mod record;
pub mod traits;

pub use record::Record;
pub use traits::{RecordStream, SourceReader, SourceSeeder, TargetWriter};
