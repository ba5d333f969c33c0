//! Support Dispatch - SLA scheduler daemon

mod bootstrap;

use support_dispatch::DispatchConfig;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Support Dispatch scheduler v{}", env!("CARGO_PKG_VERSION"));

    // Load config
    let config_path = std::env::var("CONFIG_PATH")
        .unwrap_or_else(|_| "/etc/support-dispatch/config.json".into());

    let config = DispatchConfig::load(&config_path).unwrap_or_else(|e| {
        tracing::warn!(path = %config_path, error = %e, "Config not loaded, using defaults");
        DispatchConfig::default()
    });

    let runtime = bootstrap::build(&config).await?;
    let store = runtime.store;
    let scheduler = runtime.scheduler;

    let (stop, shutdown) = watch::channel(false);
    let handle = tokio::spawn(async move { scheduler.run(shutdown).await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    // the scheduler may already have exited
    let _ = stop.send(true);

    let ticks = handle.await?;
    tracing::info!(ticks, audit_records = store.audit_records().len(), "Support Dispatch scheduler stopped");

    Ok(())
}
