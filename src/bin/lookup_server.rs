//! Lookup Server
//!
//! Serves the document of one identifier over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! INDEXER_CONFIG=config/indexer.yaml cargo run --bin lookup_server --features server
//!
//! curl 'http://localhost:3000/?uri=http://nl.dbpedia.org/resource/Albert_Einstein'
//! ```

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use dbpedia_indexer::server::{create_router, AppState};
use dbpedia_indexer::{IndexerConfig, Pipeline, Services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("dbpedia_indexer=info,tower_http=debug")
            }),
        )
        .init();

    let mut config = match std::env::var("INDEXER_CONFIG") {
        Ok(path) => IndexerConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        Err(_) => IndexerConfig::default(),
    };
    config.apply_env();
    config.validate().context("Invalid configuration")?;

    let services = Services::from_config(&config).context("Failed to create service clients")?;
    let state = AppState {
        pipeline: Arc::new(Pipeline::from_services(&config, &services)),
    };
    let app = create_router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");
    info!("Starting lookup server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
