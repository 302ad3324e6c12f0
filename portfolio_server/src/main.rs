//! Portfolio Server: personal portfolio website with an admin panel.
//!
//! Public visitors see the profile and project pages. A single administrator
//! logs in with the configured password to edit the profile, upload an avatar,
//! manage projects and import project descriptions from GitHub READMEs.

mod config;
mod error;
mod metrics;
mod migration;
mod models;
mod routes;
mod schema;
mod services;
mod session;
mod store;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use crate::config::PortfolioConfig;
use crate::store::PgStore;

#[derive(Parser)]
#[command(name = "portfolio", about = "Portfolio website with admin panel")]
struct Cli {
    /// Server port
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// PostgreSQL connection URL (falls back to SUPABASE_URL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "8")]
    max_connections: usize,

    /// Expose Prometheus metrics on this port
    #[arg(long, env = "METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Insert a placeholder profile when none exists
    #[arg(long)]
    seed_profile: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();

    tracing::info!("Starting Portfolio Server...");

    let db_url = cli
        .database_url
        .or_else(|| std::env::var("SUPABASE_URL").ok())
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL (or SUPABASE_URL) must be set"))?;
    let config = PortfolioConfig::from_env()?;

    let store = PgStore::connect(&db_url, cli.max_connections)?;
    store.migrate(cli.seed_profile).await?;

    if let Some(port) = cli.metrics_port {
        metrics::init_metrics(SocketAddr::from(([0, 0, 0, 0], port)));
        tracing::info!("Prometheus metrics on port {}", port);
    }

    let state = routes::AppState::new(Arc::new(store), config)?;
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!("Portfolio Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
