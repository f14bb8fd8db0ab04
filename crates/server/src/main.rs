use anyhow::{Context, Result};
use clap::Parser;
use services::{AppServices, Clock};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server::config::{Config, normalize_sqlite_url, prepare_sqlite_file};
use server::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let db_url = normalize_sqlite_url(&config.db_url);
    prepare_sqlite_file(&db_url).context("Failed to prepare database file")?;

    info!("Starting course-server on {}", config.bind);
    info!("Database: {db_url}");

    let services = AppServices::new_sqlite(&db_url, Clock::default_clock())
        .await
        .context("Failed to initialize storage")?;

    if let Some(name) = config.bootstrap_admin.as_deref() {
        match services
            .bootstrap_admin(name)
            .await
            .context("Failed to bootstrap admin")?
        {
            Some(id) => info!(user_id = %id, "created bootstrap admin"),
            None => info!("users already exist, skipping bootstrap admin"),
        }
    }

    let app = build_router(AppState::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
