mod auth;
mod colleges;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod profile;
mod quiz;
mod recommend;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;
mod timeline;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::AuthClient;
use crate::colleges::dataset::HttpCollegeDataset;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Guidance API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let dataset = HttpCollegeDataset::new(
        &config.college_data_base_url,
        Duration::from_secs(config.dataset_timeout_secs),
    )?;
    info!("College dataset at {}", config.college_data_base_url);


    // Build app state
    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        llm: Arc::new(llm),
        dataset: Arc::new(dataset),
        auth: Arc::new(AuthClient::new(
            &config.supabase_url,
            config.supabase_api_key.clone(),
        )),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
