mod config;
mod cv;
mod errors;
mod evidence;
mod ingest;
mod llm_client;
mod models;
mod routes;
mod state;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cv::generator::{DisabledGenerator, LlmSummaryGenerator, SummaryGenerator};
use crate::evidence::VOCABULARY_VERSION;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a provider without an API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting CV summary API v{} (vocabulary {VOCABULARY_VERSION})",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize LLM client; without a provider the pipeline is fully deterministic
    let llm = match &config.llm {
        Some(settings) => {
            let client = LlmClient::new(
                settings.provider,
                settings.api_key.clone(),
                settings.model.clone(),
                settings.max_requests_per_minute,
            )?;
            info!(
                "LLM client initialized ({:?}, model: {}, {} req/min)",
                client.provider(),
                client.model(),
                settings.max_requests_per_minute
            );
            Some(client)
        }
        None => {
            info!("No LLM provider configured; extraction and generation are disabled");
            None
        }
    };

    let generator: Arc<dyn SummaryGenerator> = match &llm {
        Some(client) => Arc::new(LlmSummaryGenerator::new(client.clone())),
        None => Arc::new(DisabledGenerator),
    };
    info!("Summary generator: {}", generator.name());

    let state = AppState {
        config: config.clone(),
        llm,
        generator,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS once the front-end origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
