//! The migrated entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Node identifier used when minting time-based ids for sample records.
const SAMPLE_NODE_ID: [u8; 6] = [0x02, 0x00, 0x5e, 0x10, 0x00, 0x01];

/// One row of the users table.
///
/// Records are immutable once built. The `id` is the source timeuuid rendered
/// as its canonical hyphenated string; it is also the target partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    id: String,
    name: String,
    email: String,
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Dummy row used to populate a source table for test runs.
    pub fn sample(index: u64) -> Self {
        Self::new(
            Uuid::now_v1(&SAMPLE_NODE_ID).to_string(),
            format!("User{}", index),
            format!("user{}@example.com", index),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
