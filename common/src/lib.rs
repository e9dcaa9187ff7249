//! Shared building blocks for the JDBC registration service.
//!
//! - `models`: connection configuration, credentials and service records
//! - `config`: environment-driven application configuration
//! - `errors`: service-level error type and HTTP mapping
//! - `response`: unified API response envelope

pub mod config;
pub mod errors;
pub mod models;
pub mod response;
pub mod utils;
