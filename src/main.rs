mod api_doc;
mod app;
mod config;
mod deploy;
mod error;
mod handlers;
mod models;
mod payload;
mod routes;
mod state;
mod storage;

use anyhow::Context;
use config::Config;
use deploy::DeployClient;
use state::AppState;
use storage::FileStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("json-drop starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store = FileStore::open(&config.storage_dir).await?;
    let deployer = config
        .deploy
        .as_ref()
        .map(DeployClient::from_config)
        .transpose()?;

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let state = AppState { store, deployer };

    let app = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("json-drop stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
