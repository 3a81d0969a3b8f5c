//! Live product feed over WebSocket
//!
//! # Architecture
//!
//! ```text
//! Client ──ws──▶ /ws ──▶ ws_handler() ──▶ ConnectionManager
//!                                              │
//!                     EventBus ──broadcast──▶ every connection
//! ```
//!
//! # Protocol
//!
//! Client → Server (JSON):
//! - `{"type": "request_products"}`
//! - `{"type": "ping"}`
//!
//! Server → Client (JSON):
//! - `{"type": "welcome", "connection_id": "..."}`
//! - `{"type": "event", "data": {...}}`
//! - `{"type": "products", "products": [...]}`
//! - `{"type": "pong"}`
//! - `{"type": "error", "message": "..."}`

mod handler;
mod manager;
pub mod protocol;

pub use manager::ConnectionManager;

use crate::server::host::ServerHost;
use anyhow::Result;
use axum::{Router, routing::get};
use std::sync::Arc;

/// WebSocket exposure
///
/// Consumes a `ServerHost` and produces a router with the `/ws` endpoint.
/// Without an event bus on the host, connections are still accepted and
/// `request_products` still works, but no catalog events are pushed.
pub struct WebSocketExposure;

impl WebSocketExposure {
    /// Build the WebSocket router and spawn the dispatch loop
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let connection_manager = Arc::new(ConnectionManager::new(host.catalog.clone()));

        if let Some(event_bus) = host.event_bus() {
            let cm = connection_manager.clone();
            let rx = event_bus.subscribe();
            tokio::spawn(async move {
                cm.run_dispatch_loop(rx).await;
            });
        } else {
            tracing::warn!(
                "No event bus configured; live feed clients will not receive catalog events"
            );
        }

        let router = Router::new()
            .route("/ws", get(handler::ws_handler))
            .with_state(connection_manager);

        Ok(router)
    }
}
