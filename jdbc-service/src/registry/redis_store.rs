//! Redis-backed registry.
//!
//! Layout:
//! - `discovery:record:<name>` holds the record as JSON
//! - `discovery:registrations` maps registration id → service name

use async_trait::async_trait;
use common::models::record::ServiceRecord;
use redis::aio::ConnectionManager as RedisConnectionManager;

use super::{ensure_up, stamp, ServiceRegistry};
use crate::client::{JdbcClient, PoolSettings};
use crate::error::RegistryError;

const RECORD_KEY_PREFIX: &str = "discovery:record:";
const REGISTRATIONS_KEY: &str = "discovery:registrations";

fn record_key(name: &str) -> String {
    format!("{}{}", RECORD_KEY_PREFIX, name)
}

/// Whether `registration` still owns the stored record.
fn is_live(current: Option<&ServiceRecord>, registration: &str) -> bool {
    current.and_then(|r| r.registration.as_deref()) == Some(registration)
}

fn backend_error(e: redis::RedisError) -> RegistryError {
    RegistryError::Backend(e.to_string())
}

/// Registry shared across processes through Redis.
pub struct RedisRegistry {
    manager: RedisConnectionManager,
    pool_settings: PoolSettings,
}

impl RedisRegistry {
    /// Connects to Redis at `url`.
    pub async fn connect(url: &str, pool_settings: PoolSettings) -> Result<Self, RegistryError> {
        let client = redis::Client::open(url).map_err(backend_error)?;
        let manager = RedisConnectionManager::new(client)
            .await
            .map_err(backend_error)?;
        tracing::info!(url = %url, "Connected to Redis registry");
        Ok(Self {
            manager,
            pool_settings,
        })
    }

    async fn load(&self, name: &str) -> Result<Option<ServiceRecord>, RegistryError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(record_key(name))
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| RegistryError::Backend(format!("corrupt record '{}': {}", name, e)))
        })
        .transpose()
    }
}

#[async_trait]
impl ServiceRegistry for RedisRegistry {
    async fn publish(&self, record: ServiceRecord) -> Result<ServiceRecord, RegistryError> {
        let record = stamp(record);
        let json = serde_json::to_string(&record)
            .map_err(|e| RegistryError::Backend(format!("cannot encode record: {}", e)))?;
        let previous = self.load(&record.name).await?;

        let mut conn = self.manager.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(record_key(&record.name))
            .arg(json)
            .ignore();
        if let Some(registration) = &record.registration {
            pipe.cmd("HSET")
                .arg(REGISTRATIONS_KEY)
                .arg(registration)
                .arg(&record.name)
                .ignore();
        }
        if let Some(old) = previous.and_then(|p| p.registration) {
            pipe.cmd("HDEL").arg(REGISTRATIONS_KEY).arg(old).ignore();
        }
        pipe.query_async::<()>(&mut conn).await.map_err(backend_error)?;

        Ok(record)
    }

    async fn lookup(&self, name: &str) -> Result<ServiceRecord, RegistryError> {
        self.load(name)
            .await?
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    async fn unpublish(&self, registration: &str) -> Result<(), RegistryError> {
        let mut conn = self.manager.clone();
        let name: Option<String> = redis::cmd("HGET")
            .arg(REGISTRATIONS_KEY)
            .arg(registration)
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;
        let name = name.ok_or_else(|| RegistryError::UnknownRegistration(registration.to_string()))?;

        // Racing publishes can leave a superseded id in the hash; it no longer owns the record.
        let live = is_live(self.load(&name).await?.as_ref(), registration);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("HDEL")
            .arg(REGISTRATIONS_KEY)
            .arg(registration)
            .ignore();
        if live {
            pipe.cmd("DEL").arg(record_key(&name)).ignore();
        }
        pipe.query_async::<()>(&mut conn).await.map_err(backend_error)?;

        if !live {
            tracing::warn!(service = %name, registration = %registration, "Dropped stale registration");
            return Err(RegistryError::UnknownRegistration(registration.to_string()));
        }
        Ok(())
    }

    async fn records(&self) -> Result<Vec<ServiceRecord>, RegistryError> {
        let mut conn = self.manager.clone();
        let mut names: Vec<String> = redis::cmd("HVALS")
            .arg(REGISTRATIONS_KEY)
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;
        names.sort();
        names.dedup();

        let mut records = Vec::with_capacity(names.len());
        for name in names {
            if let Some(record) = self.load(&name).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn instantiate(&self, record: &ServiceRecord) -> Result<JdbcClient, RegistryError> {
        ensure_up(record)?;
        JdbcClient::connect_lazy(record, &self.pool_settings)
    }
}
