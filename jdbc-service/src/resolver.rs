//! Client resolver.

use crate::client::JdbcClient;
use crate::error::LookupError;
use crate::record::JDBC_SERVICE;
use crate::registry::ServiceRegistry;

/// Resolves the `jdbc-service` record into a client.
///
/// # Errors
/// Returns `LookupError` naming `jdbc-service` and the registry failure.
pub async fn get_client(registry: &dyn ServiceRegistry) -> Result<JdbcClient, LookupError> {
    get_client_named(registry, JDBC_SERVICE).await
}

/// Resolves the record published under `name` into a client.
///
/// Every call instantiates a fresh handle; callers that want sharing keep the clone.
pub async fn get_client_named(
    registry: &dyn ServiceRegistry,
    name: &str,
) -> Result<JdbcClient, LookupError> {
    let record = registry
        .lookup(name)
        .await
        .map_err(|cause| LookupError::new(name, cause))?;

    registry.instantiate(&record).await.map_err(|cause| {
        tracing::warn!(service = %name, error = %cause, "Client instantiation failed");
        LookupError::new(name, cause)
    })
}
