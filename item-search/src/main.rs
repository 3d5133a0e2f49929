//! Item search service entry point.
//!
//! Loads configuration, syncs the catalog into the engine and serves the
//! HTTP API until Ctrl-C.

use std::env;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use item_search::{build_router, AppConfig, Dependencies, ServiceError};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let Dependencies { config, service } = Dependencies::new(config).await?;

    if config.sync_on_startup {
        info!("Syncing catalog on startup");
        match service.sync().await {
            Ok(summary) => info!(
                records_loaded = summary.load.records_loaded,
                settings_applied = summary.settings_applied,
                failures = summary.sync.failures.len(),
                "Startup sync complete"
            ),
            Err(e) => error!(error = %e, "Startup sync failed, serving anyway"),
        }
    }

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, index = %service.index(), "Listening");

    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}
