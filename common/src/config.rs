//! Application configuration.
//!
//! Values are read from environment variables, optionally seeded from a
//! `.env` file in the working directory.

use std::str::FromStr;

use crate::models::connection::{ConnectionConfig, CredentialPolicy, DRIVER_CLASS_KEY, URL_KEY};

/// Prefix for extra driver options of the startup data source.
const DATA_SOURCE_OPTION_PREFIX: &str = "JDBC_OPT_";

/// Where service records are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistryBackend {
    /// Process-local map, lost on restart.
    #[default]
    Memory,
    /// Shared Redis instance.
    Redis,
}

impl FromStr for RegistryBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(RegistryBackend::Memory),
            "redis" => Ok(RegistryBackend::Redis),
            other => Err(format!("unknown registry backend '{}'", other)),
        }
    }
}

/// Where credentials are resolved from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variables derived from the secret name.
    #[default]
    Env,
    /// HTTP secret store.
    Http,
}

impl FromStr for SecretSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "env" => Ok(SecretSource::Env),
            "http" => Ok(SecretSource::Http),
            other => Err(format!("unknown secret source '{}'", other)),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service_name: String,
    pub host: String,
    pub port: u16,
    /// Default pool ceiling when a record does not set `max_pool_size`.
    pub max_connections: u32,
    /// Default pool floor when a record does not set `min_pool_size`.
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub registry_backend: RegistryBackend,
    pub redis_url: String,
    pub secret_source: SecretSource,
    pub secret_store_url: String,
    pub credential_policy: CredentialPolicy,
    /// Upper bound for one registration request over HTTP.
    pub registration_timeout_secs: u64,
    /// Data source registered when the service starts.
    pub startup_data_source: Option<ConnectionConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "jdbc-service".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8081,
            max_connections: 10,
            min_connections: 0,
            connect_timeout_secs: 5,
            registry_backend: RegistryBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            secret_source: SecretSource::Env,
            secret_store_url: "http://127.0.0.1:8200".to_string(),
            credential_policy: CredentialPolicy::ClearThenResolve,
            registration_timeout_secs: 30,
            startup_data_source: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration for the named service from the process environment.
    pub fn load_with_service(service_name: &str) -> Self {
        let vars: Vec<(String, String)> = std::env::vars().collect();
        Self::from_vars(service_name, &vars)
    }

    /// Builds configuration from an explicit list of variables.
    pub fn from_vars(service_name: &str, vars: &[(String, String)]) -> Self {
        let lookup = |key: &str| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            service_name: service_name.to_string(),
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_or(lookup("SERVER_PORT"), "SERVER_PORT", defaults.port),
            max_connections: parse_or(
                lookup("DB_MAX_CONNECTIONS"),
                "DB_MAX_CONNECTIONS",
                defaults.max_connections,
            ),
            min_connections: parse_or(
                lookup("DB_MIN_CONNECTIONS"),
                "DB_MIN_CONNECTIONS",
                defaults.min_connections,
            ),
            connect_timeout_secs: parse_or(
                lookup("DB_CONNECT_TIMEOUT_SECS"),
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            registry_backend: parse_or(
                lookup("REGISTRY_BACKEND"),
                "REGISTRY_BACKEND",
                defaults.registry_backend,
            ),
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            secret_source: parse_or(
                lookup("SECRET_SOURCE"),
                "SECRET_SOURCE",
                defaults.secret_source,
            ),
            secret_store_url: lookup("SECRET_STORE_URL").unwrap_or(defaults.secret_store_url),
            credential_policy: parse_or(
                lookup("CREDENTIAL_POLICY"),
                "CREDENTIAL_POLICY",
                defaults.credential_policy,
            ),
            registration_timeout_secs: parse_or(
                lookup("REGISTRATION_TIMEOUT_SECS"),
                "REGISTRATION_TIMEOUT_SECS",
                defaults.registration_timeout_secs,
            ),
            startup_data_source: startup_data_source(vars),
        }
    }
}

/// Parses an optional value, keeping the default (with a warning) when it is malformed.
fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = key, value = %raw, error = %e, "Ignoring invalid setting");
                default
            }
        },
    }
}

/// Collects `JDBC_URL`, `JDBC_DRIVER_CLASS` and `JDBC_OPT_*` into a connection config.
///
/// Returns `None` when neither required variable is set. A partially set pair is
/// still returned so that registration reports the missing field.
fn startup_data_source(vars: &[(String, String)]) -> Option<ConnectionConfig> {
    let mut config = ConnectionConfig::new();
    for (key, value) in vars {
        match key.as_str() {
            "JDBC_URL" => {
                config.insert(URL_KEY, value.as_str());
            }
            "JDBC_DRIVER_CLASS" => {
                config.insert(DRIVER_CLASS_KEY, value.as_str());
            }
            _ => {
                if let Some(option) = key.strip_prefix(DATA_SOURCE_OPTION_PREFIX) {
                    if !option.is_empty() {
                        config.insert(option.to_lowercase(), value.as_str());
                    }
                }
            }
        }
    }

    if config.contains_key(URL_KEY) || config.contains_key(DRIVER_CLASS_KEY) {
        Some(config)
    } else {
        None
    }
}

/// Loads a `.env` file from the working directory (best-effort, no error if missing).
///
/// Variables already present in the environment are left untouched.
pub fn load_dotenv() {
    let Ok(content) = std::fs::read_to_string(".env") else {
        return;
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if std::env::var(key).is_err() {
                std::env::set_var(key, value.trim().trim_matches('"'));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_vars("jdbc-service", &[]);
        assert_eq!(config.port, 8081);
        assert_eq!(config.registry_backend, RegistryBackend::Memory);
        assert_eq!(config.credential_policy, CredentialPolicy::ClearThenResolve);
        assert!(config.startup_data_source.is_none());
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = AppConfig::from_vars(
            "jdbc-service",
            &vars(&[
                ("SERVER_PORT", "9000"),
                ("REGISTRY_BACKEND", "redis"),
                ("SECRET_SOURCE", "vault"),
                ("CREDENTIAL_POLICY", "merge"),
                ("DB_MAX_CONNECTIONS", "lots"),
            ]),
        );
        assert_eq!(config.port, 9000);
        assert_eq!(config.registry_backend, RegistryBackend::Redis);
        assert_eq!(config.secret_source, SecretSource::Env);
        assert_eq!(config.credential_policy, CredentialPolicy::ResolveThenMerge);
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn test_startup_data_source_collects_options() {
        let config = AppConfig::from_vars(
            "jdbc-service",
            &vars(&[
                ("JDBC_URL", "jdbc:postgresql://db:5432/app"),
                ("JDBC_DRIVER_CLASS", "org.postgresql.Driver"),
                ("JDBC_OPT_MAX_POOL_SIZE", "4"),
                ("JDBC_OPT_SECRET_NAME", "app-db"),
            ]),
        );
        let source = config.startup_data_source.unwrap();
        assert_eq!(source.get_str(URL_KEY), Some("jdbc:postgresql://db:5432/app"));
        assert_eq!(source.get_str("max_pool_size"), Some("4"));
        assert_eq!(source.get_str("secret_name"), Some("app-db"));
    }

    #[test]
    fn test_startup_data_source_partial_is_kept() {
        let config = AppConfig::from_vars("jdbc-service", &vars(&[("JDBC_URL", "jdbc:sqlite::memory:")]));
        let source = config.startup_data_source.unwrap();
        assert!(!source.contains_key(DRIVER_CLASS_KEY));
    }
}
