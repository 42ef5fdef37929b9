use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use odoo_cli::tools::{cache_report, field_list, filter_models, parse_json, print_json, status};
use odoo_cli::AppContext;
use odoo_client::{Config, Kwargs, OneOrMany, Record, RecordId, SearchOptions};

#[derive(Parser)]
#[command(name = "odoo")]
#[command(about = "Query and modify Odoo records from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Paging and ordering shared by search commands
#[derive(clap::Args)]
struct Paging {
    /// Number of records to skip
    #[arg(long, default_value = "0")]
    offset: u32,

    /// Maximum number of records
    #[arg(short, long)]
    limit: Option<u32>,

    /// Sort specification, e.g. "name asc, id desc"
    #[arg(short, long)]
    order: Option<String>,
}

impl Paging {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            offset: self.offset,
            limit: self.limit,
            order: self.order.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and print the user id
    Auth,

    /// Search record ids
    Search {
        /// Model name, e.g. res.partner
        model: String,

        /// Domain as JSON, e.g. '[["is_company", "=", true]]'
        #[arg(short, long, default_value = "[]")]
        domain: String,

        #[command(flatten)]
        paging: Paging,
    },

    /// Count records matching a domain
    Count {
        model: String,

        #[arg(short, long, default_value = "[]")]
        domain: String,
    },

    /// Search and read records
    SearchRead {
        model: String,

        #[arg(short, long, default_value = "[]")]
        domain: String,

        /// Comma-separated field names (all fields when omitted)
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,

        #[command(flatten)]
        paging: Paging,
    },

    /// Read records by id
    Read {
        model: String,

        /// A single id (5) or a JSON list of ids ([5, 3])
        ids: String,

        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Create one record (JSON object) or several (JSON array of objects)
    Create { model: String, values: String },

    /// Update records
    Write {
        model: String,

        /// A single id or a JSON list of ids
        ids: String,

        /// Field values as a JSON object
        values: String,
    },

    /// Delete records
    Unlink { model: String, ids: String },

    /// Show field definitions of a model
    Fields {
        model: String,

        /// Comma-separated attributes to return, e.g. string,type,required
        #[arg(short, long, value_delimiter = ',')]
        attributes: Vec<String>,
    },

    /// List models
    Models {
        /// Include transient (wizard) models
        #[arg(long)]
        transient: bool,

        /// Only models whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Summarize a model
    ModelInfo { model: String },

    /// Call any model method
    Execute {
        model: String,
        method: String,

        /// Positional arguments as a JSON array
        #[arg(long, default_value = "[]")]
        args: String,

        /// Keyword arguments as a JSON object
        #[arg(long, default_value = "{}")]
        kwargs: String,
    },

    /// Show server health and cache status
    Status,

    /// Show cache statistics
    CacheStats {
        /// Clear the cache afterwards
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // Initialize logging
    let level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("odoo={0},odoo_cli={0},odoo_client={0}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = AppContext::new(config?)?;
    let service = &ctx.service;

    match cli.command {
        Commands::Auth => {
            let uid = service.authenticate().await?;
            print_json(&json!({ "uid": uid }))?;
        }

        Commands::Search { model, domain, paging } => {
            let domain: Vec<Value> = parse_json("domain", &domain)?;
            let ids = service.search(&model, &domain, &paging.options()).await?;
            print_json(&ids)?;
        }

        Commands::Count { model, domain } => {
            let domain: Vec<Value> = parse_json("domain", &domain)?;
            let count = service.search_count(&model, &domain).await?;
            print_json(&json!({ "model": model, "count": count }))?;
        }

        Commands::SearchRead { model, domain, fields, paging } => {
            let domain: Vec<Value> = parse_json("domain", &domain)?;
            let records = service
                .search_read(&model, &domain, field_list(fields), &paging.options())
                .await?;
            print_json(&records)?;
        }

        Commands::Read { model, ids, fields } => {
            let ids: OneOrMany<RecordId> = parse_json("ids", &ids)?;
            let result = service.read(&model, ids, field_list(fields)).await?;
            print_json(&result)?;
        }

        Commands::Create { model, values } => {
            let values: OneOrMany<Record> = parse_json("values", &values)?;
            let ids = service.create(&model, values).await?;
            print_json(&ids)?;
        }

        Commands::Write { model, ids, values } => {
            let ids: OneOrMany<RecordId> = parse_json("ids", &ids)?;
            let values: Record = parse_json("values", &values)?;
            let written = service.write(&model, ids, values).await?;
            print_json(&json!({ "success": written }))?;
        }

        Commands::Unlink { model, ids } => {
            let ids: OneOrMany<RecordId> = parse_json("ids", &ids)?;
            let deleted = service.unlink(&model, ids).await?;
            print_json(&json!({ "success": deleted }))?;
        }

        Commands::Fields { model, attributes } => {
            let fields = service
                .fields_get(&model, None, field_list(attributes))
                .await?;
            print_json(&fields)?;
        }

        Commands::Models { transient, search } => {
            let models = service.get_model_list().await?;
            let models = filter_models(models, transient, search.as_deref());
            print_json(&models)?;
        }

        Commands::ModelInfo { model } => {
            let summary = service.model_info(&model).await?;
            print_json(&summary)?;
        }

        Commands::Execute { model, method, args, kwargs } => {
            let args: Vec<Value> = parse_json("args", &args)?;
            let kwargs: Kwargs = parse_json("kwargs", &kwargs)?;
            let result = service.execute(&model, &method, args, kwargs).await?;
            print_json(&result)?;
        }

        Commands::Status => {
            let report = status(&ctx).await?;
            print_json(&report)?;
        }

        Commands::CacheStats { clear } => {
            let stats = cache_report(&ctx, clear).await;
            print_json(&stats)?;
        }
    }

    Ok(())
}
