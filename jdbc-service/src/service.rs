//! 数据源注册服务模块
//!
//! 校验配置 → 解析凭据 → 构建记录 → 发布到注册中心

use std::sync::Arc;

use async_trait::async_trait;
use common::models::connection::{ConnectionConfig, CredentialPolicy};
use common::models::record::ServiceRecord;

use crate::client::JdbcClient;
use crate::error::{LookupError, RegistrationError};
use crate::merger::resolve_options;
use crate::record::{build_record, JDBC_SERVICE};
use crate::registry::ServiceRegistry;
use crate::resolver::get_client;
use crate::secret::SecretResolver;
use crate::validator::ConfigValidator;

/// 可注册服务 Trait
#[async_trait]
pub trait RecordService: Send + Sync {
    /// 服务名称
    fn name(&self) -> &str;

    /// 根据配置构建（未发布的）服务记录
    async fn new_record(&self, config: ConnectionConfig) -> Result<ServiceRecord, RegistrationError>;
}

/// JDBC 数据源注册服务
pub struct JdbcService {
    resolver: Arc<dyn SecretResolver>,
    registry: Arc<dyn ServiceRegistry>,
    policy: CredentialPolicy,
}

impl JdbcService {
    /// 创建服务实例（默认策略：clear-then-resolve）
    pub fn new(resolver: Arc<dyn SecretResolver>, registry: Arc<dyn ServiceRegistry>) -> Self {
        Self {
            resolver,
            registry,
            policy: CredentialPolicy::default(),
        }
    }

    /// 指定凭据合并策略
    pub fn with_policy(mut self, policy: CredentialPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CredentialPolicy {
        self.policy
    }

    pub fn registry(&self) -> &Arc<dyn ServiceRegistry> {
        &self.registry
    }

    /// 构建并发布服务记录
    ///
    /// Nothing reaches the registry unless validation and resolution both succeed.
    pub async fn register(&self, config: ConnectionConfig) -> Result<ServiceRecord, RegistrationError> {
        let record = self.new_record(config).await?;
        let published = self.registry.publish(record).await?;

        tracing::info!(
            service = %published.name,
            registration = ?published.registration,
            "Record published"
        );
        Ok(published)
    }

    /// 获取数据源客户端
    pub async fn client(&self) -> Result<JdbcClient, LookupError> {
        get_client(self.registry.as_ref()).await
    }
}

#[async_trait]
impl RecordService for JdbcService {
    fn name(&self) -> &str {
        JDBC_SERVICE
    }

    async fn new_record(&self, config: ConnectionConfig) -> Result<ServiceRecord, RegistrationError> {
        let validated = ConfigValidator::validate(config)?;
        let options = resolve_options(validated, self.resolver.as_ref(), self.policy).await?;
        Ok(build_record(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SecretError};
    use crate::registry::InMemoryRegistry;
    use crate::secret::StaticSecretResolver;
    use common::models::connection::ResolvedCredentials;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
        fail: Option<SecretError>,
    }

    #[async_trait]
    impl SecretResolver for CountingResolver {
        async fn resolve(&self, _: &ConnectionConfig) -> Result<ResolvedCredentials, SecretError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail {
                Some(err) => Err(err.clone()),
                None => Ok(ResolvedCredentials::new("u", "p")),
            }
        }
    }

    fn counting(fail: Option<SecretError>) -> Arc<CountingResolver> {
        Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn sqlite_config() -> ConnectionConfig {
        ConnectionConfig::new()
            .with("url", "jdbc:sqlite::memory:")
            .with("driver_class", "org.sqlite.JDBC")
    }

    #[tokio::test]
    async fn test_missing_url_never_calls_resolver() {
        let resolver = counting(None);
        let registry = Arc::new(InMemoryRegistry::default());
        let service = JdbcService::new(resolver.clone(), registry.clone());

        let config = ConnectionConfig::new().with("driver_class", "org.sqlite.JDBC");
        let err = service.register(config).await.unwrap_err();

        assert_eq!(
            err,
            RegistrationError::Config(ConfigError::MissingField { field: "url" })
        );
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_secret_failure_publishes_nothing() {
        let failure = SecretError::NotFound { name: "jdbc".into() };
        let resolver = counting(Some(failure.clone()));
        let registry = Arc::new(InMemoryRegistry::default());
        let service = JdbcService::new(resolver.clone(), registry.clone());

        let err = service.register(sqlite_config()).await.unwrap_err();

        assert_eq!(err, RegistrationError::Secret(failure));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_then_client() {
        let registry = Arc::new(InMemoryRegistry::default());
        let service = JdbcService::new(Arc::new(StaticSecretResolver::new("u", "p")), registry)
            .with_policy(CredentialPolicy::ResolveThenMerge);

        let published = service.register(sqlite_config()).await.unwrap();
        assert_eq!(published.name, JDBC_SERVICE);
        assert_eq!(published.options.username(), Some("u"));
        assert_eq!(service.policy(), CredentialPolicy::ResolveThenMerge);

        let client = service.client().await.unwrap();
        assert!(client.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_new_record_is_not_published() {
        let registry = Arc::new(InMemoryRegistry::default());
        let service = JdbcService::new(Arc::new(StaticSecretResolver::new("u", "p")), registry.clone());

        let record = service.new_record(sqlite_config()).await.unwrap();
        assert!(!record.is_published());
        assert_eq!(service.name(), JDBC_SERVICE);
        assert!(registry.is_empty().await);
    }
}
