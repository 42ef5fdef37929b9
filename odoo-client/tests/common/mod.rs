//! Shared fixtures: an in-process transport that records calls and a cache
//! store wrapper that counts writes.

#![allow(dead_code)]

use async_trait::async_trait;
use odoo_client::cache::{
    CacheConfig, CacheKey, CacheStats, CacheStore, CacheValue, InvalidationEvent, MemoryCache,
};
use odoo_client::{Kwargs, OdooConfig, OdooService, Transport, TransportError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const UID: i64 = 2;

/// One recorded `execute_kw` call
#[derive(Debug, Clone)]
pub struct Call {
    pub model: String,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Kwargs,
}

type Handler = dyn Fn(&str, &str, &[Value], &Kwargs) -> Result<Value, TransportError> + Send + Sync;
type AuthHandler = dyn Fn() -> Result<Value, TransportError> + Send + Sync;

/// Scripted transport answering like a small Odoo database
pub struct MockTransport {
    auth: Box<AuthHandler>,
    handler: Box<Handler>,
    delay: Duration,
    auth_calls: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    /// Accepts the login and serves the fixture data of [`fake_odoo`]
    pub fn odoo() -> Self {
        Self::new(|| Ok(json!(UID)), fake_odoo)
    }

    pub fn new<A, H>(auth: A, handler: H) -> Self
    where
        A: Fn() -> Result<Value, TransportError> + Send + Sync + 'static,
        H: Fn(&str, &str, &[Value], &Kwargs) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        Self {
            auth: Box::new(auth),
            handler: Box::new(handler),
            delay: Duration::ZERO,
            auth_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Rejects every login with `false`
    pub fn rejecting() -> Self {
        Self::new(|| Ok(json!(false)), fake_odoo)
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn execute_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls to `method`, any model
    pub fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn authenticate(
        &self,
        _database: &str,
        _login: &str,
        _secret: &str,
        _context: Kwargs,
    ) -> Result<Value, TransportError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.auth)()
    }

    async fn execute_kw(
        &self,
        _database: &str,
        uid: i64,
        _secret: &str,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Result<Value, TransportError> {
        assert_eq!(uid, UID, "execute_kw called with a foreign uid");
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            method: method.to_string(),
            args: args.clone(),
            kwargs: kwargs.clone(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.handler)(model, method, &args, &kwargs)
    }
}

fn record(id: i64) -> Value {
    json!({"id": id, "name": format!("Record {}", id), "email": format!("r{}@example.com", id)})
}

/// Fixture answers for the standard record methods
pub fn fake_odoo(model: &str, method: &str, args: &[Value], _kwargs: &Kwargs) -> Result<Value, TransportError> {
    let id_list = |value: Option<&Value>| -> Vec<i64> {
        value
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    };

    match (model, method) {
        ("ir.model", "search_read") => Ok(json!([
            {"id": 1, "model": "res.partner", "name": "Contact", "transient": false},
            {"id": 2, "model": "sale.order", "name": "Sales Order", "transient": false},
            {"id": 3, "model": "base.language.install", "name": "Install Language", "transient": true},
        ])),
        (_, "search") => Ok(json!([1, 2, 3])),
        (_, "search_read") => Ok(Value::Array((1..=3).map(record).collect())),
        (_, "read") => Ok(Value::Array(id_list(args.first()).into_iter().map(record).collect())),
        (_, "create") => {
            let count = args.first().and_then(Value::as_array).map_or(0, Vec::len) as i64;
            Ok(Value::Array((0..count).map(|i| json!(100 + i)).collect()))
        }
        (_, "write") | (_, "unlink") => Ok(json!(true)),
        (_, "fields_get") => Ok(json!({
            "id": {"type": "integer", "string": "ID"},
            "name": {"type": "char", "string": "Name"},
            "email": {"type": "char", "string": "Email"},
            "write_date": {"type": "datetime", "string": "Last Updated on"},
        })),
        _ => Err(TransportError::Fault {
            code: 200,
            message: format!("The method '{}' does not exist on the model '{}'", method, model),
        }),
    }
}

/// Cache store that counts writes and delegates to a [`MemoryCache`]
pub struct RecordingStore {
    inner: MemoryCache,
    sets: AtomicUsize,
    keys: Mutex<Vec<CacheKey>>,
}

impl RecordingStore {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: MemoryCache::new(config),
            sets: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn written_keys(&self) -> Vec<CacheKey> {
        self.keys.lock().unwrap().clone()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key).await
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    async fn get(&self, key: &str) -> Option<CacheValue> {
        self.inner.get(key).await
    }

    async fn set(&self, key: CacheKey, value: CacheValue, ttl: Option<Duration>, tags: Vec<String>) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(key.clone());
        self.inner.set(key, value, ttl, tags).await;
    }

    async fn remove(&self, key: &str) -> bool {
        self.inner.remove(key).await
    }

    async fn invalidate_by_tag(&self, tag: &str) -> InvalidationEvent {
        self.inner.invalidate_by_tag(tag).await
    }

    async fn clear(&self) {
        self.inner.clear().await
    }

    async fn stats(&self) -> CacheStats {
        self.inner.stats().await
    }
}

pub fn odoo_config() -> OdooConfig {
    OdooConfig::new("http://localhost:8069", "test_db", "admin@example.com", "admin").unwrap()
}

pub fn cache_config() -> CacheConfig {
    CacheConfig::builder()
        .default_ttl(Duration::from_secs(300))
        .max_entries(1_000)
        .build()
}

/// Service wired to `transport` and a recording store built from `cache`
pub fn service_with(
    transport: Arc<MockTransport>,
    cache: CacheConfig,
) -> (OdooService, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::new(cache.clone()));
    let service = OdooService::with_store(odoo_config(), cache, transport, store.clone());
    (service, store)
}
