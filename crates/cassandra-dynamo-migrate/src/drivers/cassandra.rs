//! Cassandra source driver.
//!
//! Reads the users table through the scylla CQL driver, which speaks the
//! native protocol to both Apache Cassandra and ScyllaDB. Rows are pulled
//! page by page from a forward-only cursor; the `id` column is a timeuuid
//! and is rendered as its canonical string.
//!
//! # Feature Flag
//!
//! Only available with the `cassandra` feature:
//!
//! ```toml
//! [dependencies]
//! cassandra-dynamo-migrate = { version = "0.1", features = ["cassandra"] }
//! ```

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use scylla::frame::response::result::Row;
use scylla::frame::value::CqlTimeuuid;
use scylla::{Session, SessionBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SourceConfig;
use crate::core::{Record, RecordStream, SourceReader, SourceSeeder};
use crate::error::{MigrateError, Result};

/// Cassandra source reader.
pub struct CassandraReader {
    config: SourceConfig,
}

impl CassandraReader {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn select_query(&self) -> String {
        format!("SELECT id, name, email FROM {}", self.config.table)
    }

    fn insert_query(&self) -> String {
        format!(
            "INSERT INTO {} (id, name, email) VALUES (?, ?, ?)",
            self.config.table
        )
    }
}

/// Convert one `(id timeuuid, name text, email text)` row into a record.
///
/// Null text columns become empty strings.
pub fn record_from_row(row: Row) -> Result<Record> {
    let (id, name, email) = row
        .into_typed::<(CqlTimeuuid, Option<String>, Option<String>)>()
        .map_err(|e| MigrateError::Query(format!("malformed row: {}", e)))?;

    Ok(Record::new(
        Uuid::from(id).to_string(),
        name.unwrap_or_default(),
        email.unwrap_or_default(),
    ))
}

#[async_trait]
impl SourceReader for CassandraReader {
    type Session = Session;

    async fn connect(&self) -> Result<Session> {
        let session = SessionBuilder::new()
            .known_node(&self.config.endpoint)
            .use_keyspace(&self.config.keyspace, false)
            .build()
            .await
            .map_err(|e| MigrateError::connection("cassandra", e.to_string()))?;

        info!(
            "Connected to Cassandra source: {} (keyspace {})",
            self.config.endpoint, self.config.keyspace
        );
        Ok(session)
    }

    fn scan<'a>(&'a self, session: &'a Session) -> RecordStream<'a> {
        let query = self.select_query();
        debug!("Scanning Cassandra table: {}", query);

        let pages = async move {
            let rows = session
                .query_iter(query, ())
                .await
                .map_err(|e| MigrateError::Query(e.to_string()))?
                .map(|row| -> Result<Record> {
                    record_from_row(row.map_err(|e| MigrateError::Query(e.to_string()))?)
                });
            Ok::<_, MigrateError>(rows)
        };

        Box::pin(stream::once(pages).try_flatten())
    }

    fn db_type(&self) -> &str {
        "cassandra"
    }

    fn describe(&self) -> String {
        format!(
            "cassandra {} {}.{}",
            self.config.endpoint, self.config.keyspace, self.config.table
        )
    }
}

#[async_trait]
impl SourceSeeder for CassandraReader {
    async fn insert(&self, session: &Session, record: &Record) -> Result<()> {
        let id = Uuid::parse_str(record.id())
            .map_err(|e| MigrateError::write(record.id(), format!("invalid timeuuid: {}", e)))?;

        session
            .query(
                self.insert_query(),
                (CqlTimeuuid::from(id), record.name(), record.email()),
            )
            .await
            .map_err(|e| MigrateError::write(record.id(), e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scylla::frame::response::result::CqlValue;

    #[test]
    fn test_queries_use_configured_table() {
        let reader = CassandraReader::new(SourceConfig {
            table: "people".to_string(),
            ..SourceConfig::default()
        });
        assert_eq!(reader.select_query(), "SELECT id, name, email FROM people");
        assert_eq!(
            reader.insert_query(),
            "INSERT INTO people (id, name, email) VALUES (?, ?, ?)"
        );
    }

    fn row(id: Option<CqlValue>, name: Option<&str>, email: Option<&str>) -> Row {
        Row {
            columns: vec![
                id,
                name.map(|n| CqlValue::Text(n.to_string())),
                email.map(|e| CqlValue::Text(e.to_string())),
            ],
        }
    }

    #[test]
    fn test_timeuuid_row_becomes_record() {
        let id = Uuid::parse_str("5b6962dd-3f90-11ef-8000-02005e100001").unwrap();
        let record = record_from_row(row(
            Some(CqlValue::Timeuuid(CqlTimeuuid::from(id))),
            Some("User1"),
            Some("user1@example.com"),
        ))
        .unwrap();

        assert_eq!(record.id(), "5b6962dd-3f90-11ef-8000-02005e100001");
        assert_eq!(record.name(), "User1");
        assert_eq!(record.email(), "user1@example.com");
    }

    #[test]
    fn test_null_text_columns_become_empty() {
        let id = Uuid::parse_str("5b6962dd-3f90-11ef-8000-02005e100001").unwrap();
        let record = record_from_row(row(
            Some(CqlValue::Timeuuid(CqlTimeuuid::from(id))),
            None,
            None,
        ))
        .unwrap();

        assert_eq!(record.name(), "");
        assert_eq!(record.email(), "");
    }

    #[test]
    fn test_non_timeuuid_id_is_query_error() {
        let err = record_from_row(row(
            Some(CqlValue::Text("not-a-uuid".to_string())),
            Some("User1"),
            Some("user1@example.com"),
        ))
        .unwrap_err();

        assert!(matches!(err, MigrateError::Query(ref m) if m.contains("malformed row")));
    }

    #[test]
    fn test_describe_names_keyspace_and_table() {
        let reader = CassandraReader::new(SourceConfig::default());
        assert_eq!(reader.describe(), "cassandra 127.0.0.1:9042 test.users");
    }
}
