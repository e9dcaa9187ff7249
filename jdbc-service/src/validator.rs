//! Connection configuration validator.
//!
//! Checks the required-field contract before any asynchronous work starts.

use common::models::connection::{ConnectionConfig, DRIVER_CLASS_KEY, URL_KEY};
use serde_json::Value;

use crate::error::ConfigError;

/// Required fields, in the order they are checked.
const REQUIRED_FIELDS: [&str; 2] = [URL_KEY, DRIVER_CLASS_KEY];

/// A configuration that carries a non-empty `url` and `driver_class`.
///
/// Only [`ConfigValidator::validate`] constructs it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig(ConnectionConfig);

impl ValidatedConfig {
    pub fn url(&self) -> &str {
        self.0.get_str(URL_KEY).unwrap_or_default()
    }

    pub fn driver_class(&self) -> &str {
        self.0.get_str(DRIVER_CLASS_KEY).unwrap_or_default()
    }

    pub fn as_config(&self) -> &ConnectionConfig {
        &self.0
    }

    pub fn into_inner(self) -> ConnectionConfig {
        self.0
    }
}

/// Validates connection configurations.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the required fields of `config`.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the first field that is absent, null,
    /// blank, or not a string. `url` is checked before `driver_class`.
    pub fn validate(config: ConnectionConfig) -> Result<ValidatedConfig, ConfigError> {
        for field in REQUIRED_FIELDS {
            require_string(&config, field)?;
        }
        Ok(ValidatedConfig(config))
    }
}

fn require_string(config: &ConnectionConfig, field: &'static str) -> Result<(), ConfigError> {
    match config.get(field) {
        None | Some(Value::Null) => Err(ConfigError::MissingField { field }),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ConfigError::MissingField { field }),
        Some(Value::String(_)) => Ok(()),
        Some(other) => Err(ConfigError::InvalidField {
            field,
            reason: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
