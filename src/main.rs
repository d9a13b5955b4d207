//! covidash binary - starts the statistics API in the background and runs
//! the dashboard in the foreground.

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use covidash::api::{self, AppState};
use covidash::config::AppConfig;
use covidash::data::DataStore;
use covidash::ui::Dashboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::parse();

    let store = DataStore::new(config.data_file.clone())
        .context("invalid backing data file configuration")?;
    let state = AppState::new(store.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("statistics API listening on http://{addr}");

    let server = tokio::spawn(api::serve(listener, state));

    let dashboard = Dashboard::new(
        store,
        format!("http://{addr}"),
        config.charts_dir,
        config.focus_country,
    )
    .context("failed to build HTTP client")?;
    dashboard.run().await;

    info!("dashboard rendered; API keeps serving until Ctrl+C");

    tokio::select! {
        result = server => match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("server error: {err}"),
            Err(err) => error!("server task failed: {err}"),
        },
        _ = shutdown_signal() => {}
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
