//! Cache invalidation strategies
//!
//! Cached query results can go stale once a record is created, written or
//! unlinked. Two consistency models are supported:
//! - TTL-only: mutations leave cached reads alone, entries age out on their own
//! - Model-scoped: every read is tagged with its model and a mutation evicts
//!   all entries carrying that model's tag

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tag attached to every cache entry derived from `model`
pub fn model_tag(model: &str) -> String {
    format!("model:{}", model)
}

/// Reason for cache invalidation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationReason {
    /// Entry expired based on TTL
    Expired,

    /// Entries carrying the tag were evicted, e.g. after a mutation of its model
    Tagged { tag: String },
}

impl std::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidationReason::Expired => write!(f, "TTL expired"),
            InvalidationReason::Tagged { tag } => write!(f, "tag invalidated: {}", tag),
        }
    }
}

/// What a mutation does to cached reads of the same model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationStrategy {
    /// Mutations evict nothing; staleness is bounded by the entry TTL
    #[default]
    TtlOnly,

    /// Mutations evict every entry tagged with the mutated model
    ModelScoped,
}

impl InvalidationStrategy {
    /// Whether a mutation of a model should evict that model's entries
    pub fn evicts_on_mutation(&self) -> bool {
        matches!(self, InvalidationStrategy::ModelScoped)
    }
}

impl FromStr for InvalidationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ttl" | "ttl_only" => Ok(InvalidationStrategy::TtlOnly),
            "model" | "model_scoped" => Ok(InvalidationStrategy::ModelScoped),
            other => Err(format!(
                "unknown invalidation strategy '{}', expected 'ttl' or 'model'",
                other
            )),
        }
    }
}

impl std::fmt::Display for InvalidationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidationStrategy::TtlOnly => write!(f, "ttl"),
            InvalidationStrategy::ModelScoped => write!(f, "model"),
        }
    }
}

/// Event describing a batch of removed entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidationEvent {
    /// Reason for invalidation
    pub reason: InvalidationReason,

    /// When the invalidation occurred
    pub timestamp: DateTime<Utc>,

    /// Keys that were invalidated
    pub keys: Vec<String>,
}

impl InvalidationEvent {
    /// Create a new invalidation event
    pub fn new(reason: InvalidationReason, keys: Vec<String>) -> Self {
        Self {
            reason,
            timestamp: Utc::now(),
            keys,
        }
    }
}
