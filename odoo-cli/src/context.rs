//! Application context shared by all commands

use anyhow::{Context, Result};
use odoo_client::{Config, OdooService};
use std::sync::Arc;
use tracing::debug;

/// Configuration and the one record service of this process
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub service: Arc<OdooService>,
}

impl AppContext {
    /// Build the context from a loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let service = OdooService::from_config(&config)
            .context("failed to create the record service")?;

        debug!(
            "Context ready for {} (database: {})",
            config.odoo.url, config.odoo.database
        );

        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }

    /// Use an already constructed service
    pub fn with_service(config: Config, service: Arc<OdooService>) -> Self {
        Self { config, service }
    }
}
