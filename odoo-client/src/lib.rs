//! # odoo-client
//!
//! A caching client for the Odoo external record API.
//!
//! ## Features
//!
//! - Session authentication performed once per service and remembered
//! - Generic `execute` primitive over a pluggable [`Transport`] (JSON-RPC by default)
//! - Read-through caching of `search`, `search_read`, `read`, `fields_get`
//!   and the model list, with a short and a long TTL class
//! - Mutations (`create`, `write`, `unlink`) with a model invalidation hook,
//!   either TTL-only or model-scoped eviction
//! - Single/bulk call shapes via [`OneOrMany`]
//! - Health checks with degraded state detection
//!
//! ## Example
//!
//! ```no_run
//! use odoo_client::{Config, OdooService, SearchOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = OdooService::from_config(&Config::from_env()?)?;
//!
//!     let partners = service
//!         .search_read(
//!             "res.partner",
//!             &[json!(["is_company", "=", true])],
//!             Some(vec!["name".to_string(), "email".to_string()]),
//!             &SearchOptions::new().limit(10).order("name asc"),
//!         )
//!         .await?;
//!     println!("{} companies", partners.len());
//!
//!     // Served from the cache
//!     let again = service
//!         .search_read(
//!             "res.partner",
//!             &[json!(["is_company", "=", true])],
//!             Some(vec!["name".to_string(), "email".to_string()]),
//!             &SearchOptions::new().limit(10).order("name asc"),
//!         )
//!         .await?;
//!     assert_eq!(partners, again);
//!     Ok(())
//! }
//! ```
//!
//! ## Health Check
//!
//! ```no_run
//! use odoo_client::{Config, OdooService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = OdooService::from_config(&Config::from_env()?)?;
//!
//!     let result = service.health_check().await;
//!     println!("Status: {} ({}ms)", result.status, result.response_time_ms);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod service;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheKey, CacheKeyBuilder, CacheStats, CacheStore,
    CacheValue, InvalidationStrategy, MemoryCache,
};
pub use config::{Config, OdooConfig};
pub use error::{OdooError, Result, TransportError};
pub use health::{HealthCheckConfig, HealthCheckResult, HealthStatus};
pub use service::OdooService;
pub use transport::{JsonRpcTransport, Kwargs, Transport};
pub use types::{
    FieldDefinitions, ModelInfo, ModelSummary, OneOrMany, ReadResult, Record, RecordId,
    SearchOptions, Uid,
};
