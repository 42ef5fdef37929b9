//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type - deterministic string built by [`CacheKeyBuilder`](super::CacheKeyBuilder)
pub type CacheKey = String;

/// Cache value type - the raw JSON result of a remote call
pub type CacheValue = serde_json::Value;

/// Statistics and metrics for cache performance monitoring
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Whether the cache is switched on
    pub enabled: bool,

    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses
    pub misses: u64,

    /// Number of entries currently in cache
    pub entries: usize,

    /// Configured entry limit
    pub max_entries: usize,

    /// Default TTL in seconds
    pub default_ttl_secs: u64,

    /// Number of evictions due to the entry limit
    pub evictions_size: u64,

    /// Number of evictions due to TTL expiration
    pub evictions_ttl: u64,

    /// Number of manual and model-scoped invalidations
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }

    /// Calculate total evictions
    pub fn total_evictions(&self) -> u64 {
        self.evictions_size + self.evictions_ttl
    }

    /// Share of the entry limit currently in use, as a percentage
    pub fn usage_percentage(&self) -> f64 {
        if self.max_entries == 0 {
            0.0
        } else {
            (self.entries as f64 / self.max_entries as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ enabled: {}, hits: {}, misses: {}, hit_rate: {:.2}%, entries: {}/{}, evictions: {}, invalidations: {} }}",
            self.enabled,
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries,
            self.max_entries,
            self.total_evictions(),
            self.invalidations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };

        assert_eq!(stats.hit_rate(), 80.0);
        assert_eq!(stats.miss_rate(), 20.0);
    }

    #[test]
    fn test_cache_stats_zero_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 100.0);
        assert_eq!(stats.usage_percentage(), 0.0);
    }

    #[test]
    fn test_usage_percentage() {
        let stats = CacheStats {
            entries: 250,
            max_entries: 1000,
            ..Default::default()
        };
        assert_eq!(stats.usage_percentage(), 25.0);
    }

    #[test]
    fn test_cache_stats_display() {
        let stats = CacheStats {
            enabled: true,
            hits: 100,
            misses: 50,
            entries: 75,
            max_entries: 1000,
            default_ttl_secs: 300,
            evictions_size: 10,
            evictions_ttl: 5,
            invalidations: 3,
        };

        let display = format!("{}", stats);
        assert!(display.contains("hits: 100"));
        assert!(display.contains("misses: 50"));
        assert!(display.contains("entries: 75/1000"));
        assert!(display.contains("evictions: 15"));
    }
}
