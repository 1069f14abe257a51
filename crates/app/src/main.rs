use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use census_search_core::{ElasticsearchStore, ReferenceData, SearchConfig, SearchCoordinator};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

mod api;
mod error;

use api::AppState;

#[derive(Parser)]
#[command(name = "census-search-api", version)]
struct Cli {
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:10300")]
    bind_addr: String,

    /// Elasticsearch base URL
    #[arg(long, env = "ELASTIC_SEARCH_URL", default_value = "http://localhost:9200")]
    elasticsearch_url: String,

    #[arg(long, env = "DATASET_SEARCH_INDEX", default_value = "datasets")]
    dataset_index: String,

    #[arg(long, env = "AREA_PROFILE_SEARCH_INDEX", default_value = "area-profiles")]
    area_profile_index: String,

    #[arg(long, env = "POSTCODE_SEARCH_INDEX", default_value = "postcodes")]
    postcode_index: String,

    /// Deepest offset a caller may page to
    #[arg(long, env = "MAX_SEARCH_RESULTS_OFFSET", default_value = "1000")]
    max_search_results_offset: usize,

    #[arg(long, env = "DIMENSIONS_FILENAME", default_value = "data/dimensions.json")]
    dimensions_filename: String,

    #[arg(long, env = "TAXONOMY_FILENAME", default_value = "data/taxonomy.json")]
    taxonomy_filename: String,

    #[arg(long, env = "HIERARCHIES_FILENAME", default_value = "data/hierarchies.json")]
    hierarchies_filename: String,

    /// Deadline for all engine calls made by one request
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    request_timeout_secs: u64,
}

impl Cli {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            dataset_index: self.dataset_index.clone(),
            area_profile_index: self.area_profile_index.clone(),
            postcode_index: self.postcode_index.clone(),
            max_window: self.max_search_results_offset,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        bind_addr = %cli.bind_addr,
        elasticsearch_url = %cli.elasticsearch_url,
        "census-search-api boot"
    );

    let reference = ReferenceData::load(
        &cli.dimensions_filename,
        &cli.hierarchies_filename,
        &cli.taxonomy_filename,
    )
    .context("loading reference data")?;
    info!(
        dimensions = reference.dimensions.items.len(),
        hierarchies = reference.hierarchies.items.len(),
        topics = reference.taxonomy.topics.len(),
        "reference data loaded"
    );

    let config = cli.search_config();
    let store = ElasticsearchStore::new(&cli.elasticsearch_url, config.request_timeout)
        .context("configuring elasticsearch client")?;
    let state = Arc::new(AppState {
        coordinator: SearchCoordinator::new(store, config),
        reference,
    });

    let listener = TcpListener::bind(&cli.bind_addr)
        .await
        .with_context(|| format!("binding {}", cli.bind_addr))?;
    info!(addr = %cli.bind_addr, "listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("census_search_api=info,census_search_core=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(%error, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                error!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
