//! Helpers shared by the CLI commands

use crate::context::AppContext;
use anyhow::{Context, Result};
use odoo_client::{CacheStats, ModelInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Parse a JSON command-line argument
pub fn parse_json<T: DeserializeOwned>(what: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("invalid JSON for {}: {}", what, raw))
}

/// `None` for an empty field list, meaning "all fields"
pub fn field_list(fields: Vec<String>) -> Option<Vec<String>> {
    let fields: Vec<String> = fields
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    (!fields.is_empty()).then_some(fields)
}

/// Drop transient models unless asked for, then keep those whose technical
/// or display name contains `search` (case-insensitive)
pub fn filter_models(
    models: Vec<ModelInfo>,
    include_transient: bool,
    search: Option<&str>,
) -> Vec<ModelInfo> {
    let needle = search.map(str::to_lowercase);

    models
        .into_iter()
        .filter(|m| include_transient || !m.transient)
        .filter(|m| match &needle {
            Some(needle) => {
                m.model.to_lowercase().contains(needle) || m.name.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect()
}

/// Server, health and cache overview
pub async fn status(ctx: &AppContext) -> Result<Value> {
    let health = ctx.service.health_check().await;
    let stats = ctx.service.cache_stats().await;
    let cache = &ctx.config.cache;

    Ok(json!({
        "server": {
            "url": ctx.config.odoo.url,
            "database": ctx.config.odoo.database,
            "username": ctx.config.odoo.username,
        },
        "health": serde_json::to_value(&health)?,
        "cache": {
            "enabled": cache.enabled,
            "ttl_secs": cache.default_ttl.as_secs(),
            "max_entries": cache.max_entries,
            "invalidation": cache.invalidation.to_string(),
            "stats": serde_json::to_value(&stats)?,
        },
    }))
}

/// Cache statistics, taken after clearing the cache when `clear` is set
pub async fn cache_report(ctx: &AppContext, clear: bool) -> CacheStats {
    if clear {
        ctx.service.clear_cache().await;
    }
    ctx.service.cache_stats().await
}

/// Pretty-print a result on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, transient: bool) -> ModelInfo {
        ModelInfo {
            id: 0,
            model: name.to_string(),
            name: name.replace('.', " "),
            transient,
        }
    }

    #[test]
    fn test_parse_json() {
        let domain: Vec<Value> = parse_json("domain", r#"[["name", "=", "x"]]"#).unwrap();
        assert_eq!(domain.len(), 1);

        let err = parse_json::<Vec<Value>>("domain", "[oops").unwrap_err();
        assert!(err.to_string().contains("domain"));
    }

    #[test]
    fn test_field_list() {
        assert_eq!(field_list(Vec::new()), None);
        assert_eq!(field_list(vec![" ".to_string()]), None);
        assert_eq!(
            field_list(vec!["name".to_string(), " email ".to_string()]),
            Some(vec!["name".to_string(), "email".to_string()])
        );
    }

    #[test]
    fn test_filter_models() {
        let models = vec![
            model("res.partner", false),
            model("sale.order", false),
            model("base.language.install", true),
        ];

        let visible = filter_models(models.clone(), false, None);
        assert_eq!(visible.len(), 2);

        let all = filter_models(models.clone(), true, None);
        assert_eq!(all.len(), 3);

        let found = filter_models(models, true, Some("PARTNER"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].model, "res.partner");
    }
}
