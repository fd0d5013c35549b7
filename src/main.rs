use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

mod config;
mod demo;
mod device;
mod http;
mod monitor;
mod photos;
mod state;
mod status;

use config::Config;
use state::AppState;

/// Lines buffered between the device reader and the event loop.
const LINE_BUFFER: usize = 64;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("🛡️ Starting Door Guard bridge...");

    let (line_tx, line_rx) = mpsc::channel(LINE_BUFFER);
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    if config.demo_mode {
        info!("🎭 Demo mode: simulating the sensor board");
        tokio::spawn(demo::run(line_tx, command_rx));
    } else {
        device::spawn_serial(&config, line_tx, command_rx)
            .with_context(|| format!("could not connect to device on {}", config.serial_port))?;
    }

    let state = AppState::new(command_tx, config.demo_mode);
    tokio::spawn(state::run_telemetry(state.clone(), line_rx));

    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    info!("✅ Door Guard running on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
}
