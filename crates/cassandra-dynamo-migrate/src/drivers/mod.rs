//! Store driver implementations.
//!
//! - [`memory`]: In-memory source and target with failure injection
//! - `cassandra`: Cassandra source (feature `cassandra`)
//! - `dynamodb`: DynamoDB target (feature `dynamodb`)
//!
//! Each driver implements the core traits from [`crate::core`]. The
//! orchestrator is generic over them, so drivers are wired together with
//! static dispatch.
//!
//! # Adding New Stores
//!
//! 1. Create a new module under `drivers/`
//! 2. Implement `SourceReader` (and `SourceSeeder` if it can be populated) or `TargetWriter`
//! 3. Gate the driver with a feature flag in `Cargo.toml`

pub mod memory;

#[cfg(feature = "cassandra")]
pub mod cassandra;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub use memory::{MemorySource, MemoryTarget};

#[cfg(feature = "cassandra")]
pub use cassandra::CassandraReader;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoWriter;
