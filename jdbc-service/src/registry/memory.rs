//! In-process registry.

use std::collections::HashMap;

use async_trait::async_trait;
use common::models::record::ServiceRecord;
use tokio::sync::RwLock;

use super::{ensure_up, stamp, ServiceRegistry};
use crate::client::{JdbcClient, PoolSettings};
use crate::error::RegistryError;

/// Registry backed by a map held in memory. Contents are lost on restart.
pub struct InMemoryRegistry {
    /// Published records indexed by service name.
    records: RwLock<HashMap<String, ServiceRecord>>,
    pool_settings: PoolSettings,
}

impl InMemoryRegistry {
    pub fn new(pool_settings: PoolSettings) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            pool_settings,
        }
    }

    /// Number of published records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new(PoolSettings::default())
    }
}

#[async_trait]
impl ServiceRegistry for InMemoryRegistry {
    async fn publish(&self, record: ServiceRecord) -> Result<ServiceRecord, RegistryError> {
        let record = stamp(record);
        let replaced = self
            .records
            .write()
            .await
            .insert(record.name.clone(), record.clone());

        if let Some(previous) = replaced {
            tracing::info!(
                service = %record.name,
                previous = ?previous.registration,
                "Record replaced"
            );
        }
        Ok(record)
    }

    async fn lookup(&self, name: &str) -> Result<ServiceRecord, RegistryError> {
        self.records
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    async fn unpublish(&self, registration: &str) -> Result<(), RegistryError> {
        let mut records = self.records.write().await;
        let name = records
            .values()
            .find(|r| r.registration.as_deref() == Some(registration))
            .map(|r| r.name.clone())
            .ok_or_else(|| RegistryError::UnknownRegistration(registration.to_string()))?;
        records.remove(&name);
        Ok(())
    }

    async fn records(&self) -> Result<Vec<ServiceRecord>, RegistryError> {
        let mut records: Vec<ServiceRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    async fn instantiate(&self, record: &ServiceRecord) -> Result<JdbcClient, RegistryError> {
        ensure_up(record)?;
        JdbcClient::connect_lazy(record, &self.pool_settings)
    }
}
