use axum::http::Method;
use clap::Parser;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};

use fundraiser_store::shell::config::AppConfig;
use fundraiser_store::shell::http::router;
use fundraiser_store::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::parse();
    let engine = Arc::new(config.open_session()?);
    if let Some(problem) = engine.load_status().await {
        tracing::warn!(error = %problem, "project collection loaded with problems");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);
    let app = router(AppState { engine })
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("projects endpoint: http://{}/projects", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
