use anyhow::Context;
use apm_query_core::{
    clock::{Clock, SystemClock},
    config::Config,
    projection::RawDocument,
    search::{SearchCondition, UseCase},
    Components,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "apm-query-core")]
#[command(about = "Telemetry query composition core", long_about = None, version)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the artifact cache sweeper until Ctrl+C (default)
    Run,

    /// Compose a filter query from a JSON array of conditions
    Compose {
        #[arg(short, long, default_value = "list")]
        use_case: UseCase,

        #[arg(short, long)]
        dataset: String,

        /// e.g. '[{"kind":"app","package_name":"com.shop","server_type":"android"}]'
        #[arg(value_name = "CONDITIONS_JSON")]
        conditions: String,
    },

    /// Print the partitions covering a time window
    Indices {
        #[arg(short, long)]
        dataset: String,

        /// RFC 3339 lower bound
        #[arg(long)]
        from: Option<DateTime<Utc>>,

        /// RFC 3339 upper bound
        #[arg(long)]
        to: Option<DateTime<Utc>>,
    },

    /// Translate and mask a raw document JSON as the service would
    Project {
        /// Document id attached to the output
        #[arg(long)]
        id: Option<String>,

        #[arg(value_name = "DOCUMENT_JSON")]
        document: String,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.observability.log_level, cli.json_logs || config.observability.json_logs);
    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config, clock).await,
        Commands::Compose {
            use_case,
            dataset,
            conditions,
        } => {
            let conditions: Vec<SearchCondition> =
                serde_json::from_str(&conditions).context("Invalid conditions JSON")?;
            let components = Components::from_config(&config, clock);
            let query = components.composer.compose(use_case, &conditions)?;
            let time = conditions.iter().find_map(|c| match c {
                SearchCondition::Time(t) => Some(*t),
                _ => None,
            });
            let indices = components.resolver.resolve(
                &dataset,
                time.and_then(|t| t.from_utc()),
                time.and_then(|t| t.to_utc()),
            )?;

            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "indices": indices,
                    "query": query.to_json(),
                }))?
            );
            Ok(())
        }
        Commands::Indices { dataset, from, to } => {
            let components = Components::from_config(&config, clock);
            for index in components.resolver.resolve(&dataset, from, to)? {
                println!("{}", index);
            }
            Ok(())
        }
        Commands::Project { id, document } => {
            let raw: RawDocument =
                serde_json::from_str(&document).context("Document must be a JSON object")?;
            let components = Components::from_config(&config, clock);
            let projected = match id {
                Some(id) => components.projector.project_hit(&id, &raw),
                None => components.projector.project(&raw),
            };
            println!("{}", serde_json::to_string_pretty(&projected)?);
            Ok(())
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("apm_query_core={}", level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<()> {
    tracing::info!("Starting apm-query-core v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = apm_query_core::metrics::init_metrics() {
        tracing::warn!("Failed to initialize metrics: {}", e);
        tracing::warn!("Continuing without metrics");
    }

    // Store-backed services are wired by the embedding application through
    // `Components::search_service` and `Components::translator`.
    let components = Components::from_config(&config, clock);
    let mut scheduler = components.scheduler(&config);
    if config.cache.sweep_enabled {
        scheduler.start()?;
    } else {
        tracing::info!("Artifact cache sweep disabled in configuration");
    }

    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutting down gracefully...");
    scheduler.stop().await?;
    Ok(())
}
