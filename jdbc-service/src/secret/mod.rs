//! Secret sources.
//!
//! A [`SecretResolver`] turns a connection configuration into credentials.
//! Which secret to fetch is named by the config's `secret_name` key.

mod env;
mod http;

use async_trait::async_trait;
use common::models::connection::{ConnectionConfig, ResolvedCredentials};

use crate::error::SecretError;

pub use env::EnvSecretResolver;
pub use http::HttpSecretResolver;

/// Config key naming the secret to resolve.
pub const SECRET_NAME_KEY: &str = "secret_name";
/// Secret name used when the config does not set one.
pub const DEFAULT_SECRET_NAME: &str = "jdbc";

/// Resolves credentials for a connection configuration.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolves credentials for `config`. Called once per registration, never retried.
    async fn resolve(&self, config: &ConnectionConfig) -> Result<ResolvedCredentials, SecretError>;
}

/// Secret name for `config`, falling back to [`DEFAULT_SECRET_NAME`].
pub fn secret_name(config: &ConnectionConfig) -> &str {
    config
        .get_str(SECRET_NAME_KEY)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_SECRET_NAME)
}

/// Returns the same credentials for every config. Intended for development and tests.
#[derive(Debug, Clone)]
pub struct StaticSecretResolver {
    credentials: ResolvedCredentials,
}

impl StaticSecretResolver {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: ResolvedCredentials::new(username, password),
        }
    }
}

#[async_trait]
impl SecretResolver for StaticSecretResolver {
    async fn resolve(&self, _config: &ConnectionConfig) -> Result<ResolvedCredentials, SecretError> {
        Ok(self.credentials.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_name_default() {
        assert_eq!(secret_name(&ConnectionConfig::new()), DEFAULT_SECRET_NAME);
        assert_eq!(
            secret_name(&ConnectionConfig::new().with(SECRET_NAME_KEY, " ")),
            DEFAULT_SECRET_NAME
        );
    }

    #[test]
    fn test_secret_name_from_config() {
        let config = ConnectionConfig::new().with(SECRET_NAME_KEY, "orders-db");
        assert_eq!(secret_name(&config), "orders-db");
    }

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticSecretResolver::new("app", "s3cret");
        let creds = resolver.resolve(&ConnectionConfig::new()).await.unwrap();
        assert_eq!(creds.username, "app");
        assert_eq!(creds.password, "s3cret");
    }
}
