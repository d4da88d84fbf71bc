//! Polygon WebSocket Client
//!
//! Connects to Polygon's real-time cluster, authenticates with the API key,
//! subscribes to the configured channels, and forwards raw event payloads to
//! the ingest dispatch loop.
//!
//! # Protocol
//!
//! All control traffic is JSON over a single socket:
//!
//! 1. Server greets with `[{"ev":"status","status":"connected",...}]`
//! 2. Client sends `{"action":"auth","params":"<API_KEY>"}`
//! 3. Server answers `[{"ev":"status","status":"auth_success",...}]`
//! 4. Client sends `{"action":"subscribe","params":"AM.*,T.*,Q.*"}`
//! 5. Data events stream as JSON arrays until the connection drops.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::messages::{EVENT_STATUS, RawEvent, decode_events};
use super::reconnect::{Backoff, BackoffConfig};

/// Status value Polygon sends after a successful auth.
const STATUS_AUTH_SUCCESS: &str = "auth_success";

/// Status value Polygon sends when auth is rejected.
const STATUS_AUTH_FAILED: &str = "auth_failed";

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur in the Polygon client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The server rejected the API key.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// Control message serialization failed.
    #[error("control message serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// Maximum reconnection attempts exceeded.
    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectAttemptsExceeded,
}

// =============================================================================
// Client Events
// =============================================================================

/// Events emitted by the Polygon client.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Connected and authenticated.
    Connected,
    /// Connection lost.
    Disconnected,
    /// Reconnecting to the cluster.
    Reconnecting {
        /// Reconnection attempt number.
        attempt: u32,
    },
    /// A raw data payload (one event object or a batch array).
    Payload(Vec<u8>),
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Polygon client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the cluster (e.g. `wss://socket.polygon.io/stocks`).
    pub url: String,
    /// Polygon API key.
    pub api_key: String,
    /// Comma-separated channel list (e.g. `AM.*,T.*,Q.*`).
    pub subscriptions: String,
    /// Reconnection backoff tuning.
    pub backoff: BackoffConfig,
}

/// Outgoing control message (`auth` or `subscribe`).
#[derive(Debug, Serialize)]
struct ControlAction<'a> {
    action: &'a str,
    params: &'a str,
}

// =============================================================================
// Client
// =============================================================================

/// Polygon WebSocket client.
///
/// Owns the connection lifecycle: authentication, subscription, and
/// reconnection with exponential backoff. Data payloads are forwarded
/// verbatim; decoding and handling happen on the ingest side.
pub struct PolygonClient {
    config: ClientConfig,
    event_tx: mpsc::Sender<FeedEvent>,
    cancel: CancellationToken,
}

impl PolygonClient {
    /// Create a new client.
    #[must_use]
    pub const fn new(
        config: ClientConfig,
        event_tx: mpsc::Sender<FeedEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            event_tx,
            cancel,
        }
    }

    /// Run the connection loop until cancelled or an unrecoverable error.
    pub async fn run(self: Arc<Self>) -> Result<(), ClientError> {
        let mut backoff = Backoff::new(self.config.backoff.clone());

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Polygon client cancelled");
                return Ok(());
            }

            match self.connect_and_run(&mut backoff).await {
                Ok(()) => {
                    tracing::info!("Polygon connection closed gracefully");
                    return Ok(());
                }
                Err(e @ ClientError::AuthRejected(_)) => {
                    // A bad key will not get better by retrying.
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Polygon connection error");
                    let _ = self.event_tx.send(FeedEvent::Disconnected).await;

                    let Some(delay) = backoff.next_delay() else {
                        return Err(ClientError::MaxReconnectAttemptsExceeded);
                    };

                    let attempt = backoff.attempts();
                    tracing::info!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        "Reconnecting to Polygon"
                    );
                    let _ = self.event_tx.send(FeedEvent::Reconnecting { attempt }).await;

                    tokio::select! {
                        () = self.cancel.cancelled() => {
                            tracing::info!("Polygon client cancelled during reconnect delay");
                            return Ok(());
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Connect, authenticate, subscribe, and pump messages until an error.
    async fn connect_and_run(&self, backoff: &mut Backoff) -> Result<(), ClientError> {
        tracing::info!(url = %self.config.url, "Connecting to Polygon stream");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.config.url).await?;
        let (mut write, mut read) = ws_stream.split();

        // Authenticate before anything else.
        let auth = serde_json::to_string(&ControlAction {
            action: "auth",
            params: &self.config.api_key,
        })?;
        write.send(Message::Text(auth.into())).await?;

        let mut authenticated = false;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if authenticated {
                                let _ = self
                                    .event_tx
                                    .send(FeedEvent::Payload(text.as_bytes().to_vec()))
                                    .await;
                            } else if self.auth_succeeded(text.as_bytes())? {
                                authenticated = true;
                                backoff.reset();

                                let subscribe = serde_json::to_string(&ControlAction {
                                    action: "subscribe",
                                    params: &self.config.subscriptions,
                                })?;
                                tracing::info!(
                                    channels = %self.config.subscriptions,
                                    "Polygon stream authenticated, subscribing"
                                );
                                write.send(Message::Text(subscribe.into())).await?;

                                let _ = self.event_tx.send(FeedEvent::Connected).await;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Server sent close frame");
                            return Err(ClientError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {
                            // Binary/pong frames carry nothing for us.
                        }
                        Some(Err(e)) => {
                            return Err(e.into());
                        }
                        None => {
                            tracing::info!("WebSocket stream ended");
                            return Err(ClientError::ConnectionClosed);
                        }
                    }
                }
            }
        }
    }

    /// Inspect pre-auth status traffic for the auth verdict.
    ///
    /// Returns true once `auth_success` is seen. The initial `connected`
    /// greeting and other statuses are logged and skipped.
    fn auth_succeeded(&self, payload: &[u8]) -> Result<bool, ClientError> {
        for value in decode_events(payload) {
            let event = RawEvent::new(&value);
            if event.event_type() != EVENT_STATUS {
                continue;
            }

            match event.str_field("status") {
                STATUS_AUTH_SUCCESS => return Ok(true),
                STATUS_AUTH_FAILED => {
                    return Err(ClientError::AuthRejected(
                        event.str_field("message").to_owned(),
                    ));
                }
                status => {
                    tracing::debug!(status, message = event.str_field("message"), "Feed status");
                }
            }
        }
        Ok(false)
    }
}
