//! Credential merger.
//!
//! Resolves credentials for a validated configuration and merges them in,
//! producing the connection options carried by a service record.

use common::models::connection::{
    ConnectionConfig, ConnectionOptions, CredentialPolicy, ResolvedCredentials, CREDENTIAL_KEYS,
};

use crate::error::SecretError;
use crate::secret::SecretResolver;
use crate::validator::ValidatedConfig;

/// Resolves credentials for `config` and merges them into it.
///
/// The resolver is called exactly once. With [`CredentialPolicy::ClearThenResolve`]
/// any caller-supplied `username`/`password` is removed first; with
/// [`CredentialPolicy::ResolveThenMerge`] it stays visible to the resolver. In both
/// cases resolved keys overwrite same-named config keys.
///
/// The merge runs on an owned copy after the resolver completes, so a dropped
/// future leaves nothing behind.
///
/// # Errors
/// Returns the resolver's `SecretError` unchanged.
pub async fn resolve_options(
    config: ValidatedConfig,
    resolver: &dyn SecretResolver,
    policy: CredentialPolicy,
) -> Result<ConnectionOptions, SecretError> {
    let mut config = config.into_inner();
    if policy.clears_existing() {
        for key in CREDENTIAL_KEYS {
            config.remove(key);
        }
    }

    let credentials = resolver.resolve(&config).await?;
    tracing::debug!(policy = %policy, "Credentials resolved, merging into connection options");

    Ok(merge(config, credentials))
}

/// Credentials-into-config merge; last write wins.
fn merge(config: ConnectionConfig, credentials: ResolvedCredentials) -> ConnectionOptions {
    let mut options = config.into_map();
    options.extend(credentials.into_map());
    ConnectionOptions::from(options)
}
