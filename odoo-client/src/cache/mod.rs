//! # Record Cache
//!
//! Read-through cache for results of remote record calls.
//!
//! ## Features
//!
//! - **TTL-Based Expiration**: two TTL classes, a short default for query
//!   results and a long one for authentication and schema metadata
//! - **Deterministic Keys**: [`CacheKeyBuilder`] encodes the operation, model
//!   and arguments as a stable JSON tuple
//! - **LRU Eviction**: least recently used entries go first once the entry
//!   limit is reached
//! - **Model-Scoped Invalidation**: entries are tagged with their model so a
//!   mutation can evict them (opt-in, see [`InvalidationStrategy`])
//!
//! ## Example
//!
//! ```rust
//! use odoo_client::cache::{CacheConfig, CacheStore, MemoryCache};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let config = CacheConfig::builder()
//!     .default_ttl(Duration::from_secs(300))
//!     .max_entries(1_000)
//!     .build();
//!
//! let cache = MemoryCache::new(config);
//!
//! cache.set("model_list".to_string(), json!([]), None, Vec::new()).await;
//!
//! if let Some(value) = cache.get("model_list").await {
//!     println!("Cache hit: {}", value);
//! }
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod invalidation;
pub mod key;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder, LONG_TTL};
pub use entry::{CacheEntry, CacheMetadata};
pub use invalidation::{model_tag, InvalidationEvent, InvalidationReason, InvalidationStrategy};
pub use key::{CacheKeyBuilder, CacheOperation, MODEL_LIST_KEY};
pub use store::{CacheStore, MemoryCache};
pub use types::{CacheKey, CacheStats, CacheValue};
