//! Server health reporting
//!
//! A health check performs a fresh authentication round trip against the
//! server and classifies the outcome by success and response time.

use crate::types::Uid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for health check behavior
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// Response time threshold for degraded state (in milliseconds)
    pub degraded_threshold_ms: u64,
    /// Maximum number of retry attempts after a failed probe
    pub max_retries: u32,
    /// Delay between retry attempts
    pub retry_delay: Duration,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            degraded_threshold_ms: 1000,
            max_retries: 0,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Server reachable and credentials accepted
    Healthy,
    /// Server responsive but slow (above degraded threshold)
    Degraded,
    /// Server unreachable, erroring, or rejecting the credentials
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy or degraded (operational)
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Detailed health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Overall health status
    pub status: HealthStatus,
    /// Response time of the last probe in milliseconds
    pub response_time_ms: u64,
    /// Server base URL
    pub url: String,
    /// Database name
    pub database: String,
    /// User id returned by the probe (if successful)
    pub uid: Option<Uid>,
    /// Timestamp of the health check
    pub timestamp: DateTime<Utc>,
    /// Error message (if unhealthy)
    pub error: Option<String>,
    /// Number of retry attempts made
    pub retry_count: u32,
}

impl HealthCheckResult {
    pub(crate) fn healthy(
        url: &str,
        database: &str,
        uid: Uid,
        response_time: Duration,
        degraded_threshold_ms: u64,
    ) -> Self {
        let response_time_ms = response_time.as_millis() as u64;
        let status = if response_time_ms > degraded_threshold_ms {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            response_time_ms,
            url: url.to_string(),
            database: database.to_string(),
            uid: Some(uid),
            timestamp: Utc::now(),
            error: None,
            retry_count: 0,
        }
    }

    pub(crate) fn unhealthy(url: &str, database: &str, response_time: Duration, error: &str) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            response_time_ms: response_time.as_millis() as u64,
            url: url.to_string(),
            database: database.to_string(),
            uid: None,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
            retry_count: 0,
        }
    }

    pub(crate) fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}
