//! Configuration for the cache system

use crate::cache::invalidation::InvalidationStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTL applied to authentication, schema and model-list results
pub const LONG_TTL: Duration = Duration::from_secs(3600);

/// Configuration for the record cache
///
/// Query results use `default_ttl`; rarely changing metadata (uid, field
/// definitions, the model registry) uses `long_ttl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false, lookups always miss and inserts are dropped
    pub enabled: bool,

    /// Time-to-live for query results. Zero keeps entries until evicted.
    pub default_ttl: Duration,

    /// Time-to-live for authentication and schema results
    pub long_ttl: Duration,

    /// Maximum number of entries in the cache
    pub max_entries: usize,

    /// TTL jitter factor (0.0 - 1.0)
    /// Adds random variation so entries written together do not expire together
    pub ttl_jitter: f64,

    /// What happens to cached reads when a model is mutated
    pub invalidation: InvalidationStrategy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 5 minutes for query results
            default_ttl: Duration::from_secs(300),
            long_ttl: LONG_TTL,
            max_entries: 1_000,
            ttl_jitter: 0.0,
            invalidation: InvalidationStrategy::TtlOnly,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Configuration with caching switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }

        if self.ttl_jitter < 0.0 || self.ttl_jitter > 1.0 {
            return Err("ttl_jitter must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }

    /// Apply the configured jitter to a base TTL
    ///
    /// Zero stays zero so never-expiring entries keep that property.
    pub fn with_jitter(&self, base: Duration) -> Duration {
        if self.ttl_jitter == 0.0 || base.is_zero() {
            return base;
        }

        let base_secs = base.as_secs_f64();
        let jitter_range = base_secs * self.ttl_jitter;
        let jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter_range;
        let final_secs = (base_secs + jitter).max(1.0);

        Duration::from_secs_f64(final_secs)
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    enabled: Option<bool>,
    default_ttl: Option<Duration>,
    long_ttl: Option<Duration>,
    max_entries: Option<usize>,
    ttl_jitter: Option<f64>,
    invalidation: Option<InvalidationStrategy>,
}

impl CacheConfigBuilder {
    /// Enable or disable caching
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set TTL for query results
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set TTL for authentication and schema results
    pub fn long_ttl(mut self, ttl: Duration) -> Self {
        self.long_ttl = Some(ttl);
        self
    }

    /// Set maximum number of cache entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set TTL jitter factor (0.0 - 1.0)
    pub fn ttl_jitter(mut self, jitter: f64) -> Self {
        self.ttl_jitter = Some(jitter);
        self
    }

    /// Set the invalidation strategy applied after mutations
    pub fn invalidation(mut self, strategy: InvalidationStrategy) -> Self {
        self.invalidation = Some(strategy);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
            long_ttl: self.long_ttl.unwrap_or(defaults.long_ttl),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            ttl_jitter: self.ttl_jitter.unwrap_or(defaults.ttl_jitter),
            invalidation: self.invalidation.unwrap_or(defaults.invalidation),
        }
    }
}
