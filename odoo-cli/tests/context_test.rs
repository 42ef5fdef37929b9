//! Integration tests for the application context and status report
//!
//! A stub transport stands in for the server.

use anyhow::Result;
use async_trait::async_trait;
use odoo_cli::tools::{cache_report, filter_models, status};
use odoo_cli::AppContext;
use odoo_client::{Config, Kwargs, OdooService, Transport, TransportError};
use serde_json::{json, Value};
use std::sync::Arc;

struct StubTransport;

#[async_trait]
impl Transport for StubTransport {
    async fn authenticate(
        &self,
        _database: &str,
        _login: &str,
        _secret: &str,
        _context: Kwargs,
    ) -> Result<Value, TransportError> {
        Ok(json!(7))
    }

    async fn execute_kw(
        &self,
        _database: &str,
        _uid: i64,
        _secret: &str,
        model: &str,
        method: &str,
        _args: Vec<Value>,
        _kwargs: Kwargs,
    ) -> Result<Value, TransportError> {
        match (model, method) {
            ("ir.model", "search_read") => Ok(json!([
                {"id": 1, "model": "res.partner", "name": "Contact", "transient": false},
                {"id": 2, "model": "res.config.settings", "name": "Config Settings", "transient": true},
            ])),
            _ => Ok(json!([])),
        }
    }
}

fn config() -> Result<Config> {
    let config = Config::from_lookup(|name| {
        let value = match name {
            "ODOO_URL" => Some("http://localhost:8069"),
            "ODOO_DB" => Some("cli_db"),
            "ODOO_USERNAME" => Some("admin"),
            "ODOO_API_KEY" => Some("key"),
            "CACHE_INVALIDATION" => Some("model"),
            _ => None,
        };
        value.map(String::from)
    })?;
    Ok(config)
}

fn context() -> Result<AppContext> {
    let config = config()?;
    let service = OdooService::new(
        config.odoo.clone(),
        config.cache.clone(),
        Arc::new(StubTransport),
    );
    Ok(AppContext::with_service(config, Arc::new(service)))
}

#[test]
fn test_context_from_config() -> Result<()> {
    let ctx = AppContext::new(config()?)?;
    assert_eq!(ctx.service.config().database, "cli_db");
    Ok(())
}

#[tokio::test]
async fn test_status_report() -> Result<()> {
    let ctx = context()?;

    let report = status(&ctx).await?;

    assert_eq!(report["server"]["url"], "http://localhost:8069");
    assert_eq!(report["server"]["database"], "cli_db");
    assert_eq!(report["health"]["status"], "healthy");
    assert_eq!(report["health"]["uid"], 7);
    assert_eq!(report["cache"]["invalidation"], "model");
    assert_eq!(report["cache"]["stats"]["entries"], 0);
    Ok(())
}

#[tokio::test]
async fn test_models_listing_hides_transient() -> Result<()> {
    let ctx = context()?;

    let models = ctx.service.get_model_list().await?;
    assert_eq!(models.len(), 2);

    let visible = filter_models(models.clone(), false, None);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].model, "res.partner");

    let settings = filter_models(models, true, Some("settings"));
    assert_eq!(settings.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_cache_report_after_clear() -> Result<()> {
    let ctx = context()?;
    ctx.service.get_model_list().await?;

    let before = cache_report(&ctx, false).await;
    assert_eq!(before.entries, 2);

    let after = cache_report(&ctx, true).await;
    assert_eq!(after.entries, 0);
    assert_eq!(after.invalidations, 2);
    Ok(())
}

#[tokio::test]
async fn test_context_shares_one_service() -> Result<()> {
    let ctx = context()?;
    let clone = ctx.clone();

    ctx.service.authenticate().await?;
    assert_eq!(clone.service.uid().await, Some(7));
    Ok(())
}
