//! Service registry backends.
//!
//! A registry stores named records, hands them back on lookup, and turns a
//! record into a live client. Records are keyed by name; publishing under an
//! existing name replaces the previous record (last publish wins).

mod memory;
mod redis_store;

use async_trait::async_trait;
use chrono::Utc;
use common::models::record::{RecordStatus, ServiceRecord};
use common::utils::IdGenerator;

use crate::client::JdbcClient;
use crate::error::RegistryError;

pub use self::memory::InMemoryRegistry;
pub use self::redis_store::RedisRegistry;

#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Stores `record` and returns it with its registration id, status and timestamp set.
    async fn publish(&self, record: ServiceRecord) -> Result<ServiceRecord, RegistryError>;

    /// Returns the record published under `name`.
    async fn lookup(&self, name: &str) -> Result<ServiceRecord, RegistryError>;

    /// Removes the record with the given registration id.
    async fn unpublish(&self, registration: &str) -> Result<(), RegistryError>;

    /// Lists every published record.
    async fn records(&self) -> Result<Vec<ServiceRecord>, RegistryError>;

    /// Creates a client handle for `record`.
    async fn instantiate(&self, record: &ServiceRecord) -> Result<JdbcClient, RegistryError>;
}

/// Marks a record as published.
fn stamp(mut record: ServiceRecord) -> ServiceRecord {
    record.registration = Some(IdGenerator::registration_id());
    record.status = RecordStatus::Up;
    record.published_at = Some(Utc::now());
    record
}

/// Rejects records that cannot back a client.
fn ensure_up(record: &ServiceRecord) -> Result<(), RegistryError> {
    match record.status {
        RecordStatus::Up => Ok(()),
        status => Err(RegistryError::Instantiation(format!(
            "record '{}' is {:?}",
            record.name, status
        ))),
    }
}
