//! Error types for Odoo operations
//!
//! This module defines the error types for the odoo-client library.
//! [`TransportError`] describes what went wrong on the wire, while
//! [`OdooError`] is what the record service surfaces to its callers.

use thiserror::Error;

/// Failure reported by a remote-call transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network or HTTP-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a fault (remote-side exception)
    #[error("Remote fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// The response body could not be understood
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Main error type for record service operations
#[derive(Error, Debug)]
pub enum OdooError {
    /// The server rejected the configured credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A remote `execute_kw` call failed
    #[error("Execution of {model}.{method} failed: {source}")]
    ExecutionFailed {
        model: String,
        method: String,
        #[source]
        source: TransportError,
    },

    /// Transport failure while authenticating
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Model is not present in the model registry
    #[error("Model not found: {0}")]
    ModelNotFound(String),
}

/// Result type alias for record service operations
pub type Result<T> = std::result::Result<T, OdooError>;

impl OdooError {
    /// Wrap a transport failure raised while executing `model.method`
    pub fn execution(model: &str, method: &str, source: TransportError) -> Self {
        OdooError::ExecutionFailed {
            model: model.to_string(),
            method: method.to_string(),
            source,
        }
    }

    /// Build an execution error for a result whose shape is not what the method returns
    pub(crate) fn malformed(model: &str, method: &str, detail: impl Into<String>) -> Self {
        Self::execution(model, method, TransportError::MalformedResponse(detail.into()))
    }
}
