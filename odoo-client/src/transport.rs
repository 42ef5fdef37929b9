//! Remote-call transport
//!
//! The record service talks to the server through the [`Transport`] trait,
//! which mirrors Odoo's external API: `common.authenticate` and
//! `object.execute_kw`. [`JsonRpcTransport`] implements it over HTTP using
//! the `/jsonrpc` endpoint.

use crate::config::OdooConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Positional and keyword arguments of an `execute_kw` call
pub type Kwargs = Map<String, Value>;

/// Uniform remote-call contract
#[async_trait]
pub trait Transport: Send + Sync {
    /// Authenticate and return the user id, or a falsy value when rejected
    async fn authenticate(
        &self,
        database: &str,
        login: &str,
        secret: &str,
        context: Kwargs,
    ) -> Result<Value, TransportError>;

    /// Run `model.method(*args, **kwargs)` on behalf of `uid`
    #[allow(clippy::too_many_arguments)]
    async fn execute_kw(
        &self,
        database: &str,
        uid: i64,
        secret: &str,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Result<Value, TransportError>;
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcFault>,
}

#[derive(Debug, Deserialize)]
struct RpcFault {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<RpcFaultData>,
}

#[derive(Debug, Deserialize)]
struct RpcFaultData {
    #[serde(default)]
    message: Option<String>,
}

/// Build the request body for `service.method(*args)`
pub(crate) fn rpc_envelope(id: u64, service: &str, method: &str, args: Vec<Value>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "call",
        "params": {
            "service": service,
            "method": method,
            "args": args,
        },
        "id": id,
    })
}

/// Extract the result of a JSON-RPC response body
///
/// The `result` member wins when present, including a JSON `null`/`false`
/// result (a rejected login answers `false`).
pub(crate) fn parse_rpc_response(body: Value) -> Result<Value, TransportError> {
    let has_result = body.get("result").is_some();
    let response: RpcResponse = serde_json::from_value(body)
        .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

    if let Some(fault) = response.error {
        let message = fault
            .data
            .and_then(|data| data.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(fault.message);
        return Err(TransportError::Fault {
            code: fault.code,
            message,
        });
    }

    if has_result {
        Ok(response.result.unwrap_or(Value::Null))
    } else {
        Err(TransportError::MalformedResponse(
            "response has neither result nor error".to_string(),
        ))
    }
}

/// HTTP transport speaking Odoo's JSON-RPC protocol
pub struct JsonRpcTransport {
    client: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    /// Create a transport for the server described by `config`
    pub fn new(config: &OdooConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/jsonrpc", config.url),
            next_id: AtomicU64::new(1),
        })
    }

    /// The URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, service: &str, method: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = rpc_envelope(id, service, method, args);

        debug!("JSON-RPC request #{} {}.{}", id, service, method);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        parse_rpc_response(body)
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    async fn authenticate(
        &self,
        database: &str,
        login: &str,
        secret: &str,
        context: Kwargs,
    ) -> Result<Value, TransportError> {
        self.call(
            "common",
            "authenticate",
            vec![json!(database), json!(login), json!(secret), Value::Object(context)],
        )
        .await
    }

    async fn execute_kw(
        &self,
        database: &str,
        uid: i64,
        secret: &str,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Result<Value, TransportError> {
        self.call(
            "object",
            "execute_kw",
            vec![
                json!(database),
                json!(uid),
                json!(secret),
                json!(model),
                json!(method),
                Value::Array(args),
                Value::Object(kwargs),
            ],
        )
        .await
    }
}
