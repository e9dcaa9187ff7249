//! Application state for the JDBC registration service.

use std::sync::Arc;

use common::config::{AppConfig, RegistryBackend, SecretSource};
use common::errors::AppResult;
use jdbc_service::{
    EnvSecretResolver, HttpSecretResolver, InMemoryRegistry, JdbcService, PoolSettings,
    RedisRegistry, SecretResolver, ServiceRegistry,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service: Arc<JdbcService>,
}

impl AppState {
    /// Wires the registry backend and secret source selected by `config`.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let pool_settings = PoolSettings::from_config(&config);

        let registry: Arc<dyn ServiceRegistry> = match config.registry_backend {
            RegistryBackend::Memory => Arc::new(InMemoryRegistry::new(pool_settings)),
            RegistryBackend::Redis => {
                Arc::new(RedisRegistry::connect(&config.redis_url, pool_settings).await?)
            }
        };

        let resolver: Arc<dyn SecretResolver> = match config.secret_source {
            SecretSource::Env => Arc::new(EnvSecretResolver::new()),
            SecretSource::Http => Arc::new(HttpSecretResolver::new(
                config.secret_store_url.clone(),
                reqwest::Client::new(),
            )),
        };

        tracing::info!(
            registry = ?config.registry_backend,
            secrets = ?config.secret_source,
            policy = %config.credential_policy,
            "Registration service wired"
        );

        let service = JdbcService::new(resolver, registry).with_policy(config.credential_policy);
        Ok(Self::with_service(config, service))
    }

    pub fn with_service(config: AppConfig, service: JdbcService) -> Self {
        Self {
            config,
            service: Arc::new(service),
        }
    }
}
