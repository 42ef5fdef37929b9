//! Record service: authenticated, cached access to the Odoo record API
//!
//! [`OdooService`] owns one logical session (the authenticated uid) and one
//! cache. Query operations are read-through cached; mutations always go to
//! the server and then run the model invalidation hook.

use crate::cache::{
    model_tag, CacheConfig, CacheKey, CacheKeyBuilder, CacheOperation, CacheStats, CacheStore,
    InvalidationEvent, MemoryCache, MODEL_LIST_KEY,
};
use crate::config::{Config, OdooConfig};
use crate::error::{OdooError, Result};
use crate::health::{HealthCheckConfig, HealthCheckResult, HealthStatus};
use crate::transport::{JsonRpcTransport, Kwargs, Transport};
use crate::types::{
    FieldDefinitions, ModelInfo, ModelSummary, OneOrMany, ReadResult, Record, RecordId,
    SearchOptions, Uid,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Model holding the registry of all models
const MODEL_REGISTRY: &str = "ir.model";

/// Fields reported by [`OdooService::model_info`] when the model defines them
const KEY_FIELDS: [&str; 5] = ["id", "name", "display_name", "create_date", "write_date"];

/// Caching client for the Odoo record API
///
/// Share it behind an [`Arc`]; all operations take `&self`.
pub struct OdooService {
    config: OdooConfig,
    cache_config: CacheConfig,
    health_config: HealthCheckConfig,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
    uid: RwLock<Option<Uid>>,
}

impl OdooService {
    /// Create a service talking JSON-RPC to the configured server, with an in-memory cache
    ///
    /// # Example
    /// ```no_run
    /// use odoo_client::{Config, OdooService};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let service = OdooService::from_config(&Config::from_env()?)?;
    ///     let uid = service.authenticate().await?;
    ///     println!("Logged in as user {}", uid);
    ///     Ok(())
    /// }
    /// ```
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = JsonRpcTransport::new(&config.odoo)?;
        Ok(Self::new(config.odoo.clone(), config.cache.clone(), Arc::new(transport)))
    }

    /// Create a service over an arbitrary transport, with an in-memory cache
    pub fn new(config: OdooConfig, cache_config: CacheConfig, transport: Arc<dyn Transport>) -> Self {
        let cache = Arc::new(MemoryCache::new(cache_config.clone()));
        Self::with_store(config, cache_config, transport, cache)
    }

    /// Create a service over an arbitrary transport and cache store
    pub fn with_store(
        config: OdooConfig,
        cache_config: CacheConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            config,
            cache_config,
            health_config: HealthCheckConfig::default(),
            transport,
            cache,
            uid: RwLock::new(None),
        }
    }

    /// Replace the health check settings
    pub fn with_health_config(mut self, health_config: HealthCheckConfig) -> Self {
        self.health_config = health_config;
        self
    }

    pub fn config(&self) -> &OdooConfig {
        &self.config
    }

    pub fn cache_config(&self) -> &CacheConfig {
        &self.cache_config
    }

    /// The session uid, if authenticated
    pub async fn uid(&self) -> Option<Uid> {
        *self.uid.read().await
    }

    /// Authenticate once and return the user id
    ///
    /// The uid is kept for the lifetime of the service and also cached under
    /// `auth:{username}:{database}` with the long TTL. A rejected login is
    /// never cached.
    pub async fn authenticate(&self) -> Result<Uid> {
        let session = *self.uid.read().await;
        if let Some(uid) = session {
            return Ok(uid);
        }

        let key = CacheKeyBuilder::auth(&self.config.username, &self.config.database);
        if let Some(uid) = self.cache.get(&key).await.as_ref().and_then(positive_uid) {
            debug!("Using cached authentication for {}", self.config.username);
            *self.uid.write().await = Some(uid);
            return Ok(uid);
        }

        info!(
            "Authenticating as {} on database {}",
            self.config.username, self.config.database
        );

        let result = self
            .transport
            .authenticate(
                &self.config.database,
                &self.config.username,
                self.config.secret(),
                Kwargs::new(),
            )
            .await?;

        let uid = match positive_uid(&result) {
            Some(uid) => uid,
            None if is_falsy(&result) => {
                warn!("Authentication rejected for {}", self.config.username);
                return Err(OdooError::AuthenticationFailed(
                    "Check your credentials".to_string(),
                ));
            }
            None => {
                warn!("Authentication returned an unexpected value: {}", result);
                return Err(OdooError::AuthenticationFailed(format!(
                    "unexpected user id {}",
                    result
                )));
            }
        };

        self.cache
            .set(key, Value::from(uid), Some(self.cache_config.long_ttl), Vec::new())
            .await;
        *self.uid.write().await = Some(uid);

        info!("Authentication successful, user ID: {}", uid);
        Ok(uid)
    }

    /// Run `model.method(*args, **kwargs)` on the server, authenticating first if needed
    pub async fn execute(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Result<Value> {
        let uid = self.authenticate().await?;

        debug!("Executing {}.{} args={:?} kwargs={:?}", model, method, args, kwargs);

        match self
            .transport
            .execute_kw(
                &self.config.database,
                uid,
                self.config.secret(),
                model,
                method,
                args,
                kwargs,
            )
            .await
        {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Execution of {}.{} failed: {}", model, method, e);
                Err(OdooError::execution(model, method, e))
            }
        }
    }

    /// Return or fetch-and-store the decoded result of `model.method`
    ///
    /// Results are decoded before they are stored, so an answer of the wrong
    /// shape fails the call and never reaches the cache. An undecodable
    /// cached value counts as a miss.
    #[allow(clippy::too_many_arguments)]
    async fn read_through<T: DeserializeOwned>(
        &self,
        key: CacheKey,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
        ttl: Option<Duration>,
    ) -> Result<T> {
        if let Some(cached) = self.cache.get(&key).await {
            match T::deserialize(&cached) {
                Ok(value) => return Ok(value),
                Err(e) => warn!("Ignoring undecodable cache entry {}: {}", key, e),
            }
        }

        let raw = self.execute(model, method, args, kwargs).await?;
        let value = T::deserialize(&raw)
            .map_err(|e| OdooError::malformed(model, method, e.to_string()))?;

        self.cache.set(key, raw, ttl, vec![model_tag(model)]).await;
        Ok(value)
    }

    /// Ids of the records matching `domain`
    pub async fn search(
        &self,
        model: &str,
        domain: &[Value],
        options: &SearchOptions,
    ) -> Result<Vec<RecordId>> {
        let key = CacheKeyBuilder::new(CacheOperation::Search, model)
            .part(domain)
            .part(options.offset)
            .part(options.limit)
            .part(options.order.clone())
            .build();

        self.read_through(
            key,
            model,
            "search",
            vec![Value::from(domain)],
            options.to_kwargs(),
            None,
        )
        .await
    }

    /// Number of records matching `domain`; shares the cache entry of an unpaged [`search`](Self::search)
    pub async fn search_count(&self, model: &str, domain: &[Value]) -> Result<usize> {
        let ids = self.search(model, domain, &SearchOptions::default()).await?;
        Ok(ids.len())
    }

    /// Records matching `domain`, restricted to `fields` (all fields when `None`)
    pub async fn search_read(
        &self,
        model: &str,
        domain: &[Value],
        fields: Option<Vec<String>>,
        options: &SearchOptions,
    ) -> Result<Vec<Record>> {
        let key = CacheKeyBuilder::new(CacheOperation::SearchRead, model)
            .part(domain)
            .part(fields.clone())
            .part(options.offset)
            .part(options.limit)
            .part(options.order.clone())
            .build();

        let mut kwargs = options.to_kwargs();
        if let Some(fields) = fields {
            kwargs.insert("fields".to_string(), Value::from(fields));
        }

        self.read_through(
            key,
            model,
            "search_read",
            vec![Value::from(domain)],
            kwargs,
            None,
        )
        .await
    }

    /// Records by id
    ///
    /// A single id yields [`ReadResult::One`] (`None` if the server returned
    /// nothing), a list yields [`ReadResult::Many`]. Id order does not affect
    /// the cache key, so `[5, 3]` and `[3, 5]` share an entry.
    pub async fn read(
        &self,
        model: &str,
        ids: impl Into<OneOrMany<RecordId>>,
        fields: Option<Vec<String>>,
    ) -> Result<ReadResult> {
        let ids = ids.into();
        let single = ids.is_one();
        let ids = ids.into_vec();

        let mut sorted = ids.clone();
        sorted.sort_unstable();

        let key = CacheKeyBuilder::new(CacheOperation::Read, model)
            .part(sorted)
            .part(fields.clone())
            .build();

        let mut kwargs = Kwargs::new();
        if let Some(fields) = fields {
            kwargs.insert("fields".to_string(), Value::from(fields));
        }

        let records: Vec<Record> = self
            .read_through(key, model, "read", vec![Value::from(ids)], kwargs, None)
            .await?;

        Ok(if single {
            ReadResult::One(records.into_iter().next())
        } else {
            ReadResult::Many(records)
        })
    }

    /// Create records; a single mapping yields a single id
    pub async fn create(
        &self,
        model: &str,
        values: impl Into<OneOrMany<Record>>,
    ) -> Result<OneOrMany<RecordId>> {
        let values = values.into();
        let single = values.is_one();
        let values = values.into_vec();

        info!("Creating {} record(s) in {}", values.len(), model);

        let args = vec![Value::Array(values.into_iter().map(Value::Object).collect())];
        let result = self.execute(model, "create", args, Kwargs::new()).await?;
        self.invalidate_model(model).await;

        let ids = OneOrMany::<RecordId>::deserialize(&result)
            .map_err(|e| OdooError::malformed(model, "create", e.to_string()))?
            .into_vec();

        if single {
            ids.into_iter()
                .next()
                .map(OneOrMany::One)
                .ok_or_else(|| OdooError::malformed(model, "create", "no id returned"))
        } else {
            Ok(OneOrMany::Many(ids))
        }
    }

    /// Update records with the same `values`
    pub async fn write(
        &self,
        model: &str,
        ids: impl Into<OneOrMany<RecordId>>,
        values: Record,
    ) -> Result<bool> {
        let ids = ids.into().into_vec();

        info!("Writing {} record(s) in {}", ids.len(), model);

        let result = self
            .execute(model, "write", vec![Value::from(ids), Value::Object(values)], Kwargs::new())
            .await?;
        // The server applied the change even if the answer is malformed
        self.invalidate_model(model).await;
        expect_bool(&result, model, "write")
    }

    /// Delete records
    pub async fn unlink(&self, model: &str, ids: impl Into<OneOrMany<RecordId>>) -> Result<bool> {
        let ids = ids.into().into_vec();

        info!("Deleting {} record(s) from {}", ids.len(), model);

        let result = self
            .execute(model, "unlink", vec![Value::from(ids)], Kwargs::new())
            .await?;
        self.invalidate_model(model).await;
        expect_bool(&result, model, "unlink")
    }

    /// Field definitions of a model, cached with the long TTL
    pub async fn fields_get(
        &self,
        model: &str,
        fields: Option<Vec<String>>,
        attributes: Option<Vec<String>>,
    ) -> Result<FieldDefinitions> {
        let key = CacheKeyBuilder::new(CacheOperation::FieldsGet, model)
            .part(fields.clone())
            .part(attributes.clone())
            .build();

        let mut kwargs = Kwargs::new();
        if let Some(fields) = fields {
            kwargs.insert("allfields".to_string(), Value::from(fields));
        }
        if let Some(attributes) = attributes {
            kwargs.insert("attributes".to_string(), Value::from(attributes));
        }

        self.read_through(
            key,
            model,
            "fields_get",
            Vec::new(),
            kwargs,
            Some(self.cache_config.long_ttl),
        )
        .await
    }

    /// All models registered on the server, cached with the long TTL
    pub async fn get_model_list(&self) -> Result<Vec<ModelInfo>> {
        if let Some(cached) = self.cache.get(MODEL_LIST_KEY).await {
            if let Ok(models) = Vec::<ModelInfo>::deserialize(&cached) {
                return Ok(models);
            }
        }

        let fields = ["model", "name", "transient"].map(String::from).to_vec();
        let records = self
            .search_read(MODEL_REGISTRY, &[], Some(fields), &SearchOptions::default())
            .await?;

        let raw = Value::Array(records.into_iter().map(Value::Object).collect());
        let models = Vec::<ModelInfo>::deserialize(&raw)
            .map_err(|e| OdooError::malformed(MODEL_REGISTRY, "search_read", e.to_string()))?;

        self.cache
            .set(
                MODEL_LIST_KEY.to_string(),
                raw,
                Some(self.cache_config.long_ttl),
                vec![model_tag(MODEL_REGISTRY)],
            )
            .await;

        Ok(models)
    }

    /// Registry entry, field count and a few well-known fields of `model`
    pub async fn model_info(&self, model: &str) -> Result<ModelSummary> {
        let info = self
            .get_model_list()
            .await?
            .into_iter()
            .find(|m| m.model == model)
            .ok_or_else(|| OdooError::ModelNotFound(model.to_string()))?;

        let fields = self.fields_get(model, None, None).await?;

        let has_records = match self.search(model, &[], &SearchOptions::new().limit(1)).await {
            Ok(ids) => Some(!ids.is_empty()),
            Err(e) => {
                warn!("Could not probe records of {}: {}", model, e);
                None
            }
        };

        let key_fields = KEY_FIELDS
            .iter()
            .filter_map(|name| {
                fields.get(*name).map(|definition| {
                    let field_type = definition
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown");
                    (name.to_string(), field_type.to_string())
                })
            })
            .collect();

        Ok(ModelSummary {
            info,
            field_count: fields.len(),
            has_records,
            key_fields,
        })
    }

    /// Invalidation hook run after every mutation of `model` the server accepted
    ///
    /// Under [`TtlOnly`](crate::cache::InvalidationStrategy::TtlOnly) nothing
    /// is evicted and cached results of the model stay visible until they
    /// expire. Under [`ModelScoped`](crate::cache::InvalidationStrategy::ModelScoped)
    /// every entry tagged with the model is removed and reported.
    pub async fn invalidate_model(&self, model: &str) -> Option<InvalidationEvent> {
        if !self.cache_config.invalidation.evicts_on_mutation() {
            debug!("Cache entries of {} left to expire by TTL", model);
            return None;
        }

        let event = self.cache.invalidate_by_tag(&model_tag(model)).await;
        debug!(
            "Invalidated {} cache entries of {} ({})",
            event.keys.len(),
            model,
            event.reason
        );
        Some(event)
    }

    /// Probe the server with a fresh authentication round trip
    ///
    /// Neither the session nor the cache is consulted or modified. Failed
    /// probes are retried per [`HealthCheckConfig`]. Always returns a
    /// result, never an error.
    pub async fn health_check(&self) -> HealthCheckResult {
        let mut retry_count = 0;

        loop {
            let result = self.probe().await;

            if result.status.is_operational() || retry_count >= self.health_config.max_retries {
                if result.status == HealthStatus::Degraded {
                    warn!(
                        "Server responding slowly ({}ms > {}ms)",
                        result.response_time_ms, self.health_config.degraded_threshold_ms
                    );
                }
                return result.with_retry_count(retry_count);
            }

            retry_count += 1;
            warn!(
                "Health check failed (attempt {}/{}), retrying after {:?}",
                retry_count, self.health_config.max_retries, self.health_config.retry_delay
            );
            tokio::time::sleep(self.health_config.retry_delay).await;
        }
    }

    async fn probe(&self) -> HealthCheckResult {
        let url = &self.config.url;
        let database = &self.config.database;
        let start = Instant::now();

        let outcome = self
            .transport
            .authenticate(database, &self.config.username, self.config.secret(), Kwargs::new())
            .await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(result) => match positive_uid(&result) {
                Some(uid) => HealthCheckResult::healthy(
                    url,
                    database,
                    uid,
                    elapsed,
                    self.health_config.degraded_threshold_ms,
                ),
                None => HealthCheckResult::unhealthy(
                    url,
                    database,
                    elapsed,
                    "authentication rejected",
                ),
            },
            Err(e) => {
                error!("Health check failed: {}", e);
                HealthCheckResult::unhealthy(url, database, elapsed, &e.to_string())
            }
        }
    }

    /// Snapshot of the cache counters
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Drop every cache entry; the session uid is kept
    pub async fn clear_cache(&self) {
        info!("Clearing cache");
        self.cache.clear().await;
    }
}

fn positive_uid(value: &Value) -> Option<Uid> {
    value.as_i64().filter(|uid| *uid > 0)
}

/// Falsy in the server's sense: `false`, `null`, zero, or empty
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn expect_bool(value: &Value, model: &str, method: &str) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| OdooError::malformed(model, method, format!("expected a boolean, got {}", value)))
}
