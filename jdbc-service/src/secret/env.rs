//! Environment-variable secret source.

use async_trait::async_trait;
use common::models::connection::{ConnectionConfig, ResolvedCredentials};

use super::{secret_name, SecretResolver};
use crate::error::SecretError;

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Reads `<NAME>_USERNAME` and `<NAME>_PASSWORD`, where `<NAME>` is the
/// secret name upper-cased with non-alphanumerics replaced by `_`.
pub struct EnvSecretResolver {
    lookup: Box<Lookup>,
}

impl EnvSecretResolver {
    /// Reads from the process environment.
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    /// Reads through a custom lookup function.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }
}

impl Default for EnvSecretResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Variable prefix for a secret name: `orders-db` → `ORDERS_DB`.
pub(crate) fn env_prefix(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SecretResolver for EnvSecretResolver {
    async fn resolve(&self, config: &ConnectionConfig) -> Result<ResolvedCredentials, SecretError> {
        let name = secret_name(config);
        let prefix = env_prefix(name);

        let username = self.var(&format!("{}_USERNAME", prefix));
        let password = self.var(&format!("{}_PASSWORD", prefix));

        match (username, password) {
            (Some(username), Some(password)) => {
                tracing::debug!(secret = %name, "Credentials resolved from environment");
                Ok(ResolvedCredentials::new(username, password))
            }
            (None, None) => Err(SecretError::NotFound {
                name: name.to_string(),
            }),
            (None, Some(_)) => Err(SecretError::Incomplete {
                name: name.to_string(),
                field: "username",
            }),
            (Some(_), None) => Err(SecretError::Incomplete {
                name: name.to_string(),
                field: "password",
            }),
        }
    }
}
