//! DynamoDB target driver.
//!
//! Writes records one `PutItem` at a time. `PutItem` replaces any item with
//! the same partition key, which gives the unconditional upsert the
//! migration relies on for safe re-runs.
//!
//! # Feature Flag
//!
//! Only available with the `dynamodb` feature:
//!
//! ```toml
//! [dependencies]
//! cassandra-dynamo-migrate = { version = "0.1", features = ["dynamodb"] }
//! ```
//!
//! Credentials come from the standard AWS provider chain. DynamoDB Local
//! accepts any credentials, but some must be resolvable.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::info;

use crate::config::TargetConfig;
use crate::core::{Record, TargetWriter};
use crate::error::{MigrateError, Result};

/// DynamoDB target writer.
pub struct DynamoWriter {
    config: TargetConfig,
}

impl DynamoWriter {
    pub fn new(config: TargetConfig) -> Self {
        Self { config }
    }

    /// Build an SDK client for the configured region and endpoint.
    ///
    /// SDK-level retries are disabled; every call is retried by the
    /// orchestrator's executor instead.
    async fn client(&self) -> Client {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .endpoint_url(&self.config.endpoint)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;
        Client::new(&sdk_config)
    }
}

/// Native attribute map for a record; field names are kept verbatim.
pub fn to_item(record: &Record) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("id".to_string(), AttributeValue::S(record.id().to_string())),
        ("name".to_string(), AttributeValue::S(record.name().to_string())),
        ("email".to_string(), AttributeValue::S(record.email().to_string())),
    ])
}

#[async_trait]
impl TargetWriter for DynamoWriter {
    type Session = Client;

    async fn connect(&self) -> Result<Client> {
        let client = self.client().await;

        // Building a client never touches the network; make sure the table
        // is reachable so connection problems surface at this stage.
        client
            .describe_table()
            .table_name(&self.config.table)
            .send()
            .await
            .map_err(|e| MigrateError::connection("dynamodb", DisplayErrorContext(&e).to_string()))?;

        info!(
            "Connected to DynamoDB target: {} (region {}, table {})",
            self.config.endpoint, self.config.region, self.config.table
        );
        Ok(client)
    }

    async fn write_one(&self, client: &Client, record: &Record) -> Result<()> {
        client
            .put_item()
            .table_name(&self.config.table)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .map_err(|e| MigrateError::write(record.id(), DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    fn db_type(&self) -> &str {
        "dynamodb"
    }

    fn describe(&self) -> String {
        format!("dynamodb {} {}", self.config.endpoint, self.config.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer pointed at a port nothing listens on, with static credentials
    /// so the provider chain resolves without touching the network.
    fn unreachable_writer() -> DynamoWriter {
        std::env::set_var("AWS_ACCESS_KEY_ID", "local");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "local");
        std::env::set_var("AWS_EC2_METADATA_DISABLED", "true");
        DynamoWriter::new(TargetConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            ..TargetConfig::default()
        })
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let writer = unreachable_writer();

        let err = writer.connect().await.unwrap_err();

        assert!(
            matches!(err, MigrateError::Connection { ref store, .. } if store == "dynamodb"),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn test_failed_put_is_write_error_for_record() {
        let writer = unreachable_writer();
        let client = writer.client().await;
        let record = Record::new("id-9", "User9", "user9@example.com");

        let err = writer.write_one(&client, &record).await.unwrap_err();

        assert!(
            matches!(err, MigrateError::Write { ref id, .. } if id == "id-9"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_item_preserves_fields() {
        let record = Record::new(
            "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "User7",
            "user7@example.com",
        );
        let item = to_item(&record);

        assert_eq!(item.len(), 3);
        assert_eq!(
            item.get("id"),
            Some(&AttributeValue::S(
                "7c9e6679-7425-40de-944b-e07fc1f90ae7".to_string()
            ))
        );
        assert_eq!(item.get("name"), Some(&AttributeValue::S("User7".to_string())));
        assert_eq!(
            item.get("email"),
            Some(&AttributeValue::S("user7@example.com".to_string()))
        );
    }
}
