//! Error types for the migration library.

use std::fmt;
use thiserror::Error;

/// Exit code for configuration errors (invalid YAML, bad values).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code when a session with either store cannot be established.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code for source query or cursor failures.
pub const EXIT_QUERY_ERROR: u8 = 3;
/// Exit code for target write failures.
pub const EXIT_WRITE_ERROR: u8 = 4;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Externally-facing step of a migration run.
///
/// Used to name the failing step when a retried operation gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ConnectSource,
    Read,
    ConnectTarget,
    Write,
    Seed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ConnectSource => "connect-source",
            Stage::Read => "read",
            Stage::ConnectTarget => "connect-target",
            Stage::Write => "write",
            Stage::Seed => "seed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session could not be established with a store
    #[error("Connection to {store} failed: {message}")]
    Connection { store: String, message: String },

    /// Source read or cursor-close failure
    #[error("Source query failed: {0}")]
    Query(String),

    /// Target upsert failure for one record
    #[error("Write failed for record {id}: {message}")]
    Write { id: String, message: String },

    /// A retried operation gave up
    #[error("Stage {stage} failed after {attempts} attempt(s)")]
    RetryExhausted {
        stage: Stage,
        attempts: u32,
        #[source]
        source: Box<MigrateError>,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Connection error naming the store it occurred against
    pub fn connection(store: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Connection {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Create a Write error for a record id
    pub fn write(id: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Write {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Wrap the last failure of a retried operation.
    pub fn retry_exhausted(stage: Stage, attempts: u32, last: MigrateError) -> Self {
        MigrateError::RetryExhausted {
            stage,
            attempts,
            source: Box::new(last),
        }
    }

    /// Stage that gave up, if this error came out of the retry executor.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            MigrateError::RetryExhausted { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Total attempts made, if this error came out of the retry executor.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            MigrateError::RetryExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) | MigrateError::Json(_) => {
                EXIT_CONFIG_ERROR
            }
            MigrateError::Connection { .. } => EXIT_CONNECTION_ERROR,
            MigrateError::Query(_) => EXIT_QUERY_ERROR,
            MigrateError::Write { .. } => EXIT_WRITE_ERROR,
            MigrateError::RetryExhausted { source, .. } => source.exit_code(),
            MigrateError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::ConnectSource.to_string(), "connect-source");
        assert_eq!(Stage::Read.to_string(), "read");
        assert_eq!(Stage::ConnectTarget.to_string(), "connect-target");
        assert_eq!(Stage::Write.to_string(), "write");
    }

    #[test]
    fn test_retry_exhausted_names_stage_and_attempts() {
        let err = MigrateError::retry_exhausted(
            Stage::Write,
            6,
            MigrateError::write("abc", "throughput exceeded"),
        );
        let msg = err.to_string();
        assert!(msg.contains("write"));
        assert!(msg.contains("6 attempt"));
        assert_eq!(err.stage(), Some(Stage::Write));
        assert_eq!(err.attempts(), Some(6));
    }

    #[test]
    fn test_exit_code_follows_wrapped_cause() {
        let err = MigrateError::retry_exhausted(
            Stage::ConnectSource,
            3,
            MigrateError::connection("cassandra", "refused"),
        );
        assert_eq!(err.exit_code(), EXIT_CONNECTION_ERROR);
        assert_eq!(MigrateError::Query("x".into()).exit_code(), EXIT_QUERY_ERROR);
        assert_eq!(MigrateError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_format_detailed_includes_cause_chain() {
        let err = MigrateError::retry_exhausted(
            Stage::Read,
            2,
            MigrateError::Query("cursor close failed".into()),
        );
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: Stage read failed after 2 attempt(s)"));
        assert!(detailed.contains("Caused by:\n  1: Source query failed: cursor close failed"));
        assert_eq!(detailed.matches("cursor close failed").count(), 1);
    }
}
