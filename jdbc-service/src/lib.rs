//! JDBC data source registration.
//!
//! Validates a connection configuration, resolves its credentials from a
//! secret source, and publishes a `jdbc-service` record to a service registry
//! that other components resolve into a pooled database client.
//!
//! ```text
//! ConnectionConfig ─► ConfigValidator ─► resolve_options ─► build_record ─► ServiceRegistry::publish
//!                                          │
//!                                          └─ SecretResolver::resolve
//!
//! ServiceRegistry ─► get_client ─► JdbcClient
//! ```

pub mod client;
pub mod error;
pub mod merger;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod secret;
pub mod service;
pub mod validator;

pub use client::{DatabasePool, DriverKind, JdbcClient, PoolSettings};
pub use error::{ConfigError, LookupError, RegistrationError, RegistryError, SecretError};
pub use merger::resolve_options;
pub use record::{build_record, JDBC_SERVICE};
pub use registry::{InMemoryRegistry, RedisRegistry, ServiceRegistry};
pub use resolver::{get_client, get_client_named};
pub use secret::{EnvSecretResolver, HttpSecretResolver, SecretResolver, StaticSecretResolver};
pub use service::{JdbcService, RecordService};
pub use validator::{ConfigValidator, ValidatedConfig};
