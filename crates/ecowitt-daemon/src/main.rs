//! Ecowitt gateway monitor daemon
//!
//! This binary coordinates:
//! - Polling the gateway's live-data endpoint on a fixed period
//! - Resolving each payload against the configured sensor assignment
//! - Serving snapshots, metrics and assignment edits over HTTP

mod config;
mod console;
mod scheduler;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ecowitt_config::SettingsFile;
use ecowitt_ingest::{FixtureSource, GatewayClient, RefreshEngine, TelemetrySource};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::console::LogSink;
use crate::scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    let config = DaemonConfig::from_env()?;
    ecowitt_obs::init("ecowittd", config.log_format);

    info!("Starting Ecowitt monitor");
    info!("Loaded configuration: {:?}", config);

    let settings_file = SettingsFile::open(&config.config_path).with_context(|| {
        format!("Failed to load settings from {}", config.config_path.display())
    })?;
    let settings = settings_file.settings().clone();

    let source: Box<dyn TelemetrySource> = match &config.fixture {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read fixture {}", path.display()))?;
            let payload = serde_json::from_str(&text).context("Fixture is not valid JSON")?;
            settings.assignment.validate()?;
            Box::new(FixtureSource::repeating(payload))
        }
        None => {
            if !settings.is_configured() {
                bail!(
                    "{} has no gateway address or sensor assignment; run ecowitt-scan first",
                    config.config_path.display()
                );
            }
            settings.validate()?;
            let client =
                GatewayClient::new(&settings.gateway_address, config.fetch_timeout(&settings))?;
            info!("Polling {}", client.url());
            Box::new(client)
        }
    };
    let engine = RefreshEngine::new(source);
    info!("Telemetry source ready: {}", engine.source_name());

    let (assignment_tx, assignment_rx) = watch::channel(Arc::new(settings.assignment.clone()));
    let (app, state) = ecowitt_api::build_app(assignment_tx, Some(settings_file));

    let bind = config.http_bind(&settings);
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("HTTP listening on {}", bind);

    let (stop_http, http_stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = http_stopped.await;
            })
            .await
    });

    let mut scheduler = Scheduler::new(engine, assignment_rx, config.poll_interval(&settings));
    scheduler.add_sink(Box::new(LogSink::new()));
    scheduler.add_sink(Box::new(ecowitt_api::ApiSink::new(state)));

    let shutdown = setup_shutdown_handler();

    info!("Daemon running - press Ctrl+C to stop");

    tokio::select! {
        result = scheduler.run() => {
            if let Err(e) = result {
                error!("Scheduler error: {}", e);
                return Err(e);
            }
        }
        _ = shutdown => {
            info!("Shutdown signal received");
        }
    }

    let _ = stop_http.send(());
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("HTTP server error: {}", e),
        Err(e) => error!("HTTP server task failed: {}", e),
    }

    info!("Ecowitt monitor stopped");
    Ok(())
}

/// Setup graceful shutdown handler
async fn setup_shutdown_handler() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to setup signal handler");
}
