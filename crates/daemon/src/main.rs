use anyhow::Result;
use clap::Parser;
use quay_daemon::config::DaemonConfig;
use quay_http::services::JwtConfig;
use quay_http::{AppState, Server};
use quay_memory::MemoryStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Quay daemon - device management API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    EnvFilter::new("quay_core=debug,quay_http=debug,quay_daemon=debug,tower_http=debug")
                }),
        )
        .init();

    let config = match cli.config {
        Some(path) => {
            info!(%path, "loading configuration");
            DaemonConfig::from_file(&path)?
        }
        None => DaemonConfig::from_env()?,
    };

    let store = Arc::new(MemoryStore::new());

    if let Some(bootstrap) = &config.bootstrap {
        quay_daemon::bootstrap::seed(store.as_ref(), bootstrap).await?;
    }

    let state = AppState::new(
        store,
        JwtConfig::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_expiration_hours,
            config.auth.issuer.clone(),
        ),
    );

    let server = Server::new(
        state,
        config.http.cors_enabled,
        Duration::from_secs(config.http.timeout_secs),
    );

    let addr = config.http.bind_addr;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve(addr).await {
            tracing::error!("server error: {e}");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("received shutdown signal");

    server_handle.abort();

    Ok(())
}
