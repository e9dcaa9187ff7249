//! Data source connection models.
//!
//! A data source is described by a free-form, string-keyed map. Only `url`
//! and `driver_class` are mandatory; every other key is a driver option and
//! travels through registration untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Connection string key.
pub const URL_KEY: &str = "url";
/// Driver identifier key.
pub const DRIVER_CLASS_KEY: &str = "driver_class";
/// Username key.
pub const USERNAME_KEY: &str = "username";
/// Password key.
pub const PASSWORD_KEY: &str = "password";
/// Keys owned by the secret source.
pub const CREDENTIAL_KEYS: [&str; 2] = [USERNAME_KEY, PASSWORD_KEY];
/// Keys owned by the caller and checked before resolution.
pub const REQUIRED_KEYS: [&str; 2] = [URL_KEY, DRIVER_CLASS_KEY];

/// Caller-supplied data source configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct ConnectionConfig(Map<String, Value>);

impl ConnectionConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value under `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ConnectionConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Final connection details: configuration merged with resolved credentials.
///
/// Read-only. Produced by the credential merge and carried by service records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct ConnectionOptions(Map<String, Value>);

impl ConnectionOptions {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Reads a non-negative integer, accepting both JSON numbers and numeric strings.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.get_str(URL_KEY)
    }

    pub fn driver_class(&self) -> Option<&str> {
        self.get_str(DRIVER_CLASS_KEY)
    }

    pub fn username(&self) -> Option<&str> {
        self.get_str(USERNAME_KEY)
    }

    pub fn password(&self) -> Option<&str> {
        self.get_str(PASSWORD_KEY)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Copy of the options without the password, for responses and logs.
    pub fn redacted(&self) -> Map<String, Value> {
        let mut map = self.0.clone();
        map.remove(PASSWORD_KEY);
        map
    }
}

impl From<Map<String, Value>> for ConnectionOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Credentials returned by a secret source.
#[derive(Clone, PartialEq, Deserialize)]
pub struct ResolvedCredentials {
    pub username: String,
    pub password: String,
    /// Additional fields supplied by the secret source. Only string values
    /// outside [`REQUIRED_KEYS`] survive [`ResolvedCredentials::into_map`].
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResolvedCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Flattens into a mapping; `username` and `password` always win over extras.
    ///
    /// Extras naming a required key, or holding anything but a string, are dropped
    /// so a secret source cannot undo validation.
    pub fn into_map(self) -> Map<String, Value> {
        let mut map: Map<String, Value> = self
            .extra
            .into_iter()
            .filter(|(key, value)| value.is_string() && !REQUIRED_KEYS.contains(&key.as_str()))
            .collect();
        map.insert(USERNAME_KEY.to_string(), Value::String(self.username));
        map.insert(PASSWORD_KEY.to_string(), Value::String(self.password));
        map
    }
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("username", &self.username)
            .field("password", &"******")
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// How caller-supplied credentials are treated before resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredentialPolicy {
    /// Strip `username`/`password` from the config before asking the secret source.
    #[default]
    ClearThenResolve,
    /// Keep them visible to the secret source; its output still overwrites on merge.
    ResolveThenMerge,
}

impl CredentialPolicy {
    pub fn clears_existing(&self) -> bool {
        matches!(self, CredentialPolicy::ClearThenResolve)
    }
}

impl fmt::Display for CredentialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialPolicy::ClearThenResolve => write!(f, "clear-then-resolve"),
            CredentialPolicy::ResolveThenMerge => write!(f, "resolve-then-merge"),
        }
    }
}

impl FromStr for CredentialPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear" | "clear-then-resolve" => Ok(CredentialPolicy::ClearThenResolve),
            "merge" | "resolve-then-merge" => Ok(CredentialPolicy::ResolveThenMerge),
            other => Err(format!("unknown credential policy '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_deserializes_from_plain_object() {
        let config: ConnectionConfig = serde_json::from_value(json!({
            "url": "jdbc:mysql://db:3306/orders",
            "driver_class": "com.mysql.cj.jdbc.Driver",
            "max_pool_size": 8
        }))
        .unwrap();
        assert_eq!(config.get_str(URL_KEY), Some("jdbc:mysql://db:3306/orders"));
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn test_options_numeric_strings() {
        let options = ConnectionOptions::from(
            json!({ "max_pool_size": "12", "min_pool_size": 2, "bad": "x" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(options.get_u64("max_pool_size"), Some(12));
        assert_eq!(options.get_u64("min_pool_size"), Some(2));
        assert_eq!(options.get_u64("bad"), None);
        assert_eq!(options.get_u64("missing"), None);
    }

    #[test]
    fn test_redacted_drops_password() {
        let options = ConnectionOptions::from(
            json!({ "url": "u", "username": "app", "password": "s3cret" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let redacted = options.redacted();
        assert!(!redacted.contains_key(PASSWORD_KEY));
        assert_eq!(redacted.get(USERNAME_KEY), Some(&json!("app")));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = ResolvedCredentials::new("app", "s3cret");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("app"));
    }

    #[test]
    fn test_credentials_fields_win_over_extras() {
        let mut creds = ResolvedCredentials::new("app", "s3cret").with_extra("role", "reader");
        creds.extra.insert(USERNAME_KEY.to_string(), json!("shadow"));
        let map = creds.into_map();
        assert_eq!(map.get(USERNAME_KEY), Some(&json!("app")));
        assert_eq!(map.get("role"), Some(&json!("reader")));
    }

    #[test]
    fn test_credentials_extras_cannot_touch_required_keys() {
        let map = ResolvedCredentials::new("app", "s3cret")
            .with_extra(URL_KEY, Value::Null)
            .with_extra(DRIVER_CLASS_KEY, "")
            .with_extra("max_pool_size", 4)
            .with_extra("schema", "billing")
            .into_map();

        assert!(!map.contains_key(URL_KEY));
        assert!(!map.contains_key(DRIVER_CLASS_KEY));
        assert!(!map.contains_key("max_pool_size"));
        assert_eq!(map.get("schema"), Some(&json!("billing")));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_credential_policy_parse() {
        assert_eq!(
            "clear".parse::<CredentialPolicy>().unwrap(),
            CredentialPolicy::ClearThenResolve
        );
        assert_eq!(
            "Resolve-Then-Merge".parse::<CredentialPolicy>().unwrap(),
            CredentialPolicy::ResolveThenMerge
        );
        assert!("sometimes".parse::<CredentialPolicy>().is_err());
        assert_eq!(CredentialPolicy::default(), CredentialPolicy::ClearThenResolve);
    }
}
