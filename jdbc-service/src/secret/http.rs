//! HTTP secret store client.

use async_trait::async_trait;
use common::models::connection::{ConnectionConfig, ResolvedCredentials};
use reqwest::StatusCode;

use super::{secret_name, SecretResolver};
use crate::error::SecretError;

/// Fetches credentials with `GET {base_url}/secrets/{name}`.
///
/// The store answers with a JSON object carrying at least `username` and
/// `password`; any other fields are merged into the connection options too.
pub struct HttpSecretResolver {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpSecretResolver {
    pub fn new(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    fn secret_url(&self, name: &str) -> String {
        format!("{}/secrets/{}", self.base_url.trim_end_matches('/'), name)
    }
}

#[async_trait]
impl SecretResolver for HttpSecretResolver {
    async fn resolve(&self, config: &ConnectionConfig) -> Result<ResolvedCredentials, SecretError> {
        let name = secret_name(config);
        let url = self.secret_url(name);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SecretError::Unavailable(format!("cannot reach secret store: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(SecretError::NotFound {
                    name: name.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(SecretError::Unavailable(format!(
                    "secret store answered {} for '{}'",
                    status, name
                )))
            }
            _ => {}
        }

        let credentials: ResolvedCredentials = response
            .json()
            .await
            .map_err(|e| SecretError::Malformed(e.to_string()))?;

        tracing::debug!(secret = %name, "Credentials resolved from secret store");
        Ok(credentials)
    }
}
