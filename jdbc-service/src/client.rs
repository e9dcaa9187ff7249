//! Database client handles.
//!
//! Turns a JDBC service record into a lazily connected sqlx pool. The driver
//! is picked from `driver_class`, falling back to the `jdbc:<scheme>:` URL.

use std::str::FromStr;
use std::time::{Duration, Instant};

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::connection::ConnectionOptions;
use common::models::record::ServiceRecord;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{MySqlPool, PgPool, SqlitePool};

use crate::error::RegistryError;

/// Pool size option keys understood in connection options.
const MAX_POOL_SIZE_KEY: &str = "max_pool_size";
const MIN_POOL_SIZE_KEY: &str = "min_pool_size";
/// Idle time in seconds before a pooled connection is closed.
const MAX_IDLE_TIME_KEY: &str = "max_idle_time";

/// Database family behind a JDBC driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// MySQL and MariaDB.
    MySQL,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    SQLite,
}

impl DriverKind {
    /// Maps a JDBC driver class name.
    pub fn from_driver_class(class: &str) -> Option<Self> {
        match class.trim() {
            "com.mysql.cj.jdbc.Driver" | "com.mysql.jdbc.Driver" | "org.mariadb.jdbc.Driver" => {
                Some(DriverKind::MySQL)
            }
            "org.postgresql.Driver" => Some(DriverKind::Postgres),
            "org.sqlite.JDBC" => Some(DriverKind::SQLite),
            _ => None,
        }
    }

    /// Maps the scheme of a (possibly `jdbc:`-prefixed) connection URL.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = native_url(url).split(':').next()?.to_lowercase();
        match scheme.as_str() {
            "mysql" | "mariadb" => Some(DriverKind::MySQL),
            "postgres" | "postgresql" => Some(DriverKind::Postgres),
            "sqlite" => Some(DriverKind::SQLite),
            _ => None,
        }
    }

    /// Picks the driver for a set of connection options.
    pub fn detect(options: &ConnectionOptions) -> Result<Self, RegistryError> {
        let class = options.driver_class().unwrap_or_default();
        Self::from_driver_class(class)
            .or_else(|| options.url().and_then(Self::from_url))
            .ok_or_else(|| RegistryError::Instantiation(format!("unsupported driver '{}'", class)))
    }
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverKind::MySQL => write!(f, "mysql"),
            DriverKind::Postgres => write!(f, "postgres"),
            DriverKind::SQLite => write!(f, "sqlite"),
        }
    }
}

/// Strips the `jdbc:` prefix so sqlx can parse the URL.
pub fn native_url(url: &str) -> &str {
    let url = url.trim();
    url.strip_prefix("jdbc:").unwrap_or(url)
}

/// Pool sizing and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
}

impl PoolSettings {
    /// Service-wide defaults.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            acquire_timeout: Duration::from_secs(config.connect_timeout_secs),
            idle_timeout: None,
        }
    }

    /// Applies per-record overrides from connection options.
    pub fn with_options(&self, options: &ConnectionOptions) -> Self {
        let to_u32 = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);
        let max_connections = options
            .get_u64(MAX_POOL_SIZE_KEY)
            .map(to_u32)
            .filter(|n| *n > 0)
            .unwrap_or(self.max_connections);
        let min_connections = options
            .get_u64(MIN_POOL_SIZE_KEY)
            .map(to_u32)
            .unwrap_or(self.min_connections)
            .min(max_connections);

        Self {
            max_connections,
            min_connections,
            acquire_timeout: self.acquire_timeout,
            idle_timeout: options
                .get_u64(MAX_IDLE_TIME_KEY)
                .map(Duration::from_secs)
                .or(self.idle_timeout),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Connection pool for the supported database families.
#[derive(Debug, Clone)]
pub enum DatabasePool {
    MySQL(MySqlPool),
    Postgres(PgPool),
    SQLite(SqlitePool),
}

/// Live, poolable client bound to a service record.
///
/// Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct JdbcClient {
    service_name: String,
    driver: DriverKind,
    pool: DatabasePool,
}

impl JdbcClient {
    /// Builds a client from a record without opening any connection.
    ///
    /// Credentials are applied through typed connect options, never spliced into the URL.
    pub fn connect_lazy(record: &ServiceRecord, defaults: &PoolSettings) -> Result<Self, RegistryError> {
        let options = &record.options;
        let url = options
            .url()
            .ok_or_else(|| RegistryError::Instantiation("record has no url".into()))?;
        let driver = DriverKind::detect(options)?;
        let settings = defaults.with_options(options);
        let native = native_url(url);
        let invalid_url =
            |e: sqlx::Error| RegistryError::Instantiation(format!("invalid {} url: {}", driver, e));

        let pool = match driver {
            DriverKind::MySQL => {
                let mut connect = MySqlConnectOptions::from_str(native).map_err(invalid_url)?;
                if let Some(username) = options.username() {
                    connect = connect.username(username);
                }
                if let Some(password) = options.password() {
                    connect = connect.password(password);
                }
                DatabasePool::MySQL(
                    MySqlPoolOptions::new()
                        .max_connections(settings.max_connections)
                        .min_connections(settings.min_connections)
                        .acquire_timeout(settings.acquire_timeout)
                        .idle_timeout(settings.idle_timeout)
                        .connect_lazy_with(connect),
                )
            }
            DriverKind::Postgres => {
                let mut connect = PgConnectOptions::from_str(native).map_err(invalid_url)?;
                if let Some(username) = options.username() {
                    connect = connect.username(username);
                }
                if let Some(password) = options.password() {
                    connect = connect.password(password);
                }
                DatabasePool::Postgres(
                    PgPoolOptions::new()
                        .max_connections(settings.max_connections)
                        .min_connections(settings.min_connections)
                        .acquire_timeout(settings.acquire_timeout)
                        .idle_timeout(settings.idle_timeout)
                        .connect_lazy_with(connect),
                )
            }
            DriverKind::SQLite => {
                let connect = SqliteConnectOptions::from_str(native)
                    .map_err(invalid_url)?
                    .create_if_missing(true);
                // In-memory SQLite databases are private to a connection.
                DatabasePool::SQLite(
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .acquire_timeout(settings.acquire_timeout)
                        .idle_timeout(settings.idle_timeout)
                        .connect_lazy_with(connect),
                )
            }
        };

        tracing::debug!(
            service = %record.name,
            driver = %driver,
            max_connections = settings.max_connections,
            "Client pool created"
        );

        Ok(Self {
            service_name: record.name.clone(),
            driver,
            pool,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn driver(&self) -> DriverKind {
        self.driver
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Runs `SELECT 1` and returns the round-trip latency.
    pub async fn ping(&self) -> AppResult<Duration> {
        let start = Instant::now();
        match &self.pool {
            DatabasePool::MySQL(pool) => {
                sqlx::query("SELECT 1").execute(pool).await.map_err(map_sqlx_error)?;
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await.map_err(map_sqlx_error)?;
            }
            DatabasePool::SQLite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await.map_err(map_sqlx_error)?;
            }
        }
        Ok(start.elapsed())
    }

    /// Closes the pool; clones sharing it are closed too.
    pub async fn close(&self) {
        match &self.pool {
            DatabasePool::MySQL(pool) => pool.close().await,
            DatabasePool::Postgres(pool) => pool.close().await,
            DatabasePool::SQLite(pool) => pool.close().await,
        }
    }
}

fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => AppError::DatabaseConnection(e.to_string()),
        other => AppError::DatabaseQuery(other.to_string()),
    }
}
