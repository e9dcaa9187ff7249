//! Shared data models.

pub mod connection;
pub mod record;

// Re-export commonly used types
pub use connection::{ConnectionConfig, ConnectionOptions, CredentialPolicy, ResolvedCredentials};
pub use record::{RecordItem, RecordStatus, RecordType, ServiceRecord};
