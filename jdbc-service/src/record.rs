//! Record publisher.

use common::models::connection::ConnectionOptions;
use common::models::record::{RecordType, ServiceRecord};
use serde_json::Map;

/// Name under which the JDBC data source is published.
pub const JDBC_SERVICE: &str = "jdbc-service";

/// Wraps connection options into an unpublished JDBC service record.
///
/// Metadata is left empty. Persisting the record is up to the registry.
pub fn build_record(options: ConnectionOptions) -> ServiceRecord {
    ServiceRecord::new(JDBC_SERVICE, RecordType::Jdbc, Map::new(), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::record::RecordStatus;
    use serde_json::json;

    #[test]
    fn test_build_record() {
        let options = ConnectionOptions::from(
            json!({ "url": "jdbc:sqlite::memory:", "driver_class": "org.sqlite.JDBC" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let record = build_record(options.clone());

        assert_eq!(record.name, JDBC_SERVICE);
        assert_eq!(record.record_type, RecordType::Jdbc);
        assert!(record.metadata.is_empty());
        assert_eq!(record.options, options);
        assert_eq!(record.status, RecordStatus::Unknown);
        assert!(!record.is_published());
    }
}
