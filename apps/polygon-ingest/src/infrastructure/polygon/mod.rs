//! Polygon Feed Integration
//!
//! WebSocket client, wire message parsing, and the ingest handlers that turn
//! feed events into columnar store writes.

pub mod client;
pub mod handlers;
pub mod messages;
pub mod reconnect;

pub use client::{ClientConfig, ClientError, FeedEvent, PolygonClient};
pub use handlers::IngestHandlers;
pub use reconnect::{Backoff, BackoffConfig};
