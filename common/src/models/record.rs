//! Service discovery record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::connection::ConnectionOptions;

/// Kind of service a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// JDBC-style relational data source.
    Jdbc,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::Jdbc => write!(f, "jdbc"),
        }
    }
}

/// Availability of a published record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Up,
    Down,
    /// Built but not yet published.
    #[default]
    Unknown,
}

/// Named, typed descriptor stored in a service registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Service name used for lookups.
    pub name: String,
    /// Service type.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Reserved for discriminators such as environment or tenant.
    pub metadata: Map<String, Value>,
    /// Merged connection options.
    pub options: ConnectionOptions,
    /// Registration id assigned by the registry on publish.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub registration: Option<String>,
    /// Record status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Publication timestamp.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl ServiceRecord {
    /// Creates an unpublished record.
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        metadata: Map<String, Value>,
        options: ConnectionOptions,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            metadata,
            options,
            registration: None,
            status: RecordStatus::Unknown,
            published_at: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.registration.is_some()
    }
}

/// Record view for API responses (excludes the password).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordItem {
    /// Service name.
    pub name: String,
    /// Service type.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Record metadata.
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
    /// Connection options with the password removed.
    #[schema(value_type = Object)]
    pub options: Map<String, Value>,
    /// Registration id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
    /// Record status.
    pub status: RecordStatus,
    /// Publication timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl From<ServiceRecord> for RecordItem {
    fn from(record: ServiceRecord) -> Self {
        Self {
            options: record.options.redacted(),
            name: record.name,
            record_type: record.record_type,
            metadata: record.metadata,
            registration: record.registration,
            status: record.status,
            published_at: record.published_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> ConnectionOptions {
        ConnectionOptions::from(
            json!({
                "url": "jdbc:postgresql://db/app",
                "driver_class": "org.postgresql.Driver",
                "username": "app",
                "password": "s3cret"
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
    }

    #[test]
    fn test_record_serializes_type_field() {
        let record = ServiceRecord::new("jdbc-service", RecordType::Jdbc, Map::new(), options());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], json!("jdbc"));
        assert_eq!(value["status"], json!("UNKNOWN"));
        assert!(value.get("registration").is_none());
    }

    #[test]
    fn test_record_json_keeps_options() {
        let record = ServiceRecord::new("jdbc-service", RecordType::Jdbc, Map::new(), options());
        let stored = serde_json::to_string(&record).unwrap();
        let loaded: ServiceRecord = serde_json::from_str(&stored).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_record_item_hides_password() {
        let record = ServiceRecord::new("jdbc-service", RecordType::Jdbc, Map::new(), options());
        let item = RecordItem::from(record);
        assert!(!item.options.contains_key("password"));
        assert_eq!(item.options.get("username"), Some(&json!("app")));
    }
}
