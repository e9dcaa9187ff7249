//! Error types for validation, credential resolution and registry access.

use common::errors::AppError;
use thiserror::Error;

/// Required connection field missing or malformed. Raised before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("'{field}' is required")]
    MissingField { field: &'static str },

    #[error("'{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ConfigError {
    /// The offending field name.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::MissingField { field } | ConfigError::InvalidField { field, .. } => field,
        }
    }
}

/// Credential resolution failure, returned to callers exactly as the secret source produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    #[error("secret '{name}' not found")]
    NotFound { name: String },

    #[error("secret '{name}' has no {field}")]
    Incomplete { name: String, field: &'static str },

    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed secret payload: {0}")]
    Malformed(String),
}

/// Low-level registry failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no record named '{0}'")]
    NotFound(String),

    #[error("no registration '{0}'")]
    UnknownRegistration(String),

    #[error("registry backend failure: {0}")]
    Backend(String),

    #[error("cannot instantiate client: {0}")]
    Instantiation(String),
}

/// Lookup or instantiation failure for a named service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service '{service_name}' unavailable: {cause}")]
pub struct LookupError {
    pub service_name: String,
    #[source]
    pub cause: RegistryError,
}

impl LookupError {
    pub fn new(service_name: impl Into<String>, cause: RegistryError) -> Self {
        Self {
            service_name: service_name.into(),
            cause,
        }
    }
}

/// Failure of the validate → resolve → build → publish pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<SecretError> for AppError {
    fn from(e: SecretError) -> Self {
        AppError::Secret(e.to_string())
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(name) => AppError::ServiceNotFound(name),
            RegistryError::UnknownRegistration(id) => AppError::RegistrationNotFound(id),
            other => AppError::Registry(other.to_string()),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e.cause {
            RegistryError::NotFound(_) => AppError::ServiceNotFound(e.service_name),
            _ => AppError::Registry(e.to_string()),
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Config(e) => e.into(),
            RegistrationError::Secret(e) => e.into(),
            RegistrationError::Registry(e) => e.into(),
        }
    }
}
