use anyhow::Result;
use tracing_subscriber::EnvFilter;

use bookrag::ask::AskService;
use bookrag::cohere::CohereClient;
use bookrag::config;
use bookrag::qdrant_store::QdrantStore;
use bookrag::server::route_table;
use bookrag::{run_server, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let vars = config::env_snapshot();
    if !config::check_environment(&vars) {
        tracing::error!("cannot start server: required configuration is missing");
        std::process::exit(1);
    }

    let config = AppConfig::from_vars(&vars)?;
    tracing::info!("starting server on port {}", config.port);

    let routes = route_table();
    tracing::info!("serving {} routes:", routes.len());
    for route in &routes {
        tracing::info!("  {} [{}]", route.path, route.methods.join(", "));
    }

    let cohere = CohereClient::new(
        config.cohere_base_url.clone(),
        config.cohere_api_key.clone(),
    );
    let qdrant = QdrantStore::new(
        config.qdrant_url.clone(),
        config.qdrant_api_key.clone(),
        config.qdrant_collection.clone(),
    );
    let ask = AskService::new(config.clone(), cohere, qdrant);

    run_server(config, ask).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
