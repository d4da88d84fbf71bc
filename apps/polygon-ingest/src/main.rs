//! Polygon Ingest Binary
//!
//! Starts the market-data ingest service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin polygon-ingest
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `POLYGON_API_KEY`: Polygon API key
//!
//! ## Optional
//! - `POLYGON_CLUSTER`: stocks | forex | crypto (default: stocks)
//! - `POLYGON_SUBSCRIPTIONS`: Channel list (default: `AM.*,T.*,Q.*`)
//! - `INGEST_DATA_DIR`: Bucket file directory (default: data)
//! - `INGEST_METRICS_PORT`: Prometheus port, 0 disables (default: 9090)
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: polygon-ingest)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use polygon_ingest::infrastructure::metrics;
use polygon_ingest::infrastructure::polygon::{
    BackoffConfig, ClientConfig, FeedEvent, IngestHandlers, PolygonClient,
};
use polygon_ingest::infrastructure::telemetry;
use polygon_ingest::{BackfillTracker, IngestConfig, JsonlStore, RecordWriter};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    // Initialize telemetry (tracing + optional OTLP export)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Polygon ingest");

    let config = IngestConfig::from_env()?;
    log_config(&config);

    metrics::init_metrics(config.metrics_port)?;

    let shutdown_token = CancellationToken::new();

    // Store adapter and shared ingest state
    let store = JsonlStore::new(config.pipeline.data_dir.clone()).await?;
    let writer: Arc<dyn RecordWriter> = Arc::new(store);
    let backfill = Arc::new(BackfillTracker::new());
    let handlers = Arc::new(IngestHandlers::new(writer, backfill));

    // Feed client
    let (event_tx, event_rx) =
        mpsc::channel::<FeedEvent>(config.pipeline.event_channel_capacity);

    let client_config = ClientConfig {
        url: config.stream_url(),
        api_key: config.api_key.as_str().to_owned(),
        subscriptions: config.subscriptions.clone(),
        backoff: BackoffConfig {
            initial_delay: config.websocket.reconnect_delay_initial,
            max_delay: config.websocket.reconnect_delay_max,
            multiplier: config.websocket.reconnect_delay_multiplier,
            max_attempts: config.websocket.max_reconnect_attempts,
            ..BackoffConfig::default()
        },
    };
    let client = Arc::new(PolygonClient::new(
        client_config,
        event_tx,
        shutdown_token.clone(),
    ));

    // Spawn the dispatch loop
    let dispatch_handlers = Arc::clone(&handlers);
    tokio::spawn(async move {
        dispatch_events(event_rx, dispatch_handlers).await;
    });

    // Spawn the feed client
    let client_shutdown = shutdown_token.clone();
    tokio::spawn(async move {
        if let Err(e) = client.run().await {
            tracing::error!(error = %e, "Polygon client error");
            client_shutdown.cancel();
        }
    });

    tracing::info!("Ingest ready");

    await_shutdown(shutdown_token).await;

    tracing::info!("Ingest stopped");
    Ok(())
}

/// Pump feed events into handler tasks.
///
/// Each payload is handled on its own spawned task: handler invocations run
/// concurrently with no ordering guarantee, matching the delivery model of
/// the upstream feed.
async fn dispatch_events(mut rx: mpsc::Receiver<FeedEvent>, handlers: Arc<IngestHandlers>) {
    while let Some(event) = rx.recv().await {
        match event {
            FeedEvent::Connected => {
                tracing::info!("Feed connected");
            }
            FeedEvent::Disconnected => {
                tracing::warn!("Feed disconnected");
            }
            FeedEvent::Reconnecting { attempt } => {
                tracing::info!(attempt, "Feed reconnecting");
            }
            FeedEvent::Payload(payload) => {
                let handlers = Arc::clone(&handlers);
                tokio::spawn(async move {
                    handlers.handle_payload(&payload).await;
                });
            }
        }
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &IngestConfig) {
    tracing::info!(
        cluster = config.cluster.as_str(),
        subscriptions = %config.subscriptions,
        data_dir = %config.pipeline.data_dir.display(),
        metrics_port = config.metrics_port,
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT) or internal cancellation.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
        () = shutdown_token.cancelled() => {
            tracing::info!("Internal shutdown requested");
        }
    }

    shutdown_token.cancel();
}
