//! regval-server: standalone REST server for file validation.
//!
//! Configuration comes from `REGVAL_*` environment variables, optionally
//! loaded from a `.env` file; see `config.rs` for the full list.

use anyhow::Context;
use regval_server::config::ServerConfig;
use regval_server::router::build_router;
use regval_server::AppState;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,regval_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let registry = config.load_registry()?;
    tracing::info!(
        validators = registry.len(),
        source = %config
            .layouts_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".into()),
        "Layout registry loaded"
    );

    let state = AppState::new(registry, config.engine.clone(), config.audit_capacity);
    let app = build_router(state, config.max_upload_bytes);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("regval-server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("regval-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
