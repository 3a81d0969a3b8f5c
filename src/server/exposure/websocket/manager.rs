//! Connection manager for WebSocket clients
//!
//! The `ConnectionManager` tracks all active WebSocket connections. Every
//! catalog event arriving from the `EventBus` is fanned out to all of them.
//!
//! # Architecture
//!
//! ```text
//! EventBus ──recv──▶ ConnectionManager::run_dispatch_loop()
//!                          │
//!                    for each connection
//!                          │
//!                    ──▶ send to client via mpsc channel
//! ```

use super::protocol::ServerMessage;
use crate::catalog::CatalogService;
use crate::core::events::EventEnvelope;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast, mpsc};
use uuid::Uuid;

/// Manages all active WebSocket connections
///
/// Thread-safe via `RwLock`; reads (dispatch) are frequent, writes
/// (connect/disconnect) are infrequent.
pub struct ConnectionManager {
    catalog: Arc<CatalogService>,
    /// Sender to each connection's write loop, indexed by connection ID
    connections: RwLock<HashMap<String, mpsc::UnboundedSender<ServerMessage>>>,
}

impl ConnectionManager {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self {
            catalog,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns a tuple of (connection_id, receiver) where the receiver
    /// will receive `ServerMessage`s to forward to the client.
    pub async fn connect(&self) -> (String, mpsc::UnboundedReceiver<ServerMessage>) {
        let connection_id = format!("conn_{}", Uuid::new_v4().simple());
        let (tx, rx) = mpsc::unbounded_channel();

        self.connections
            .write()
            .await
            .insert(connection_id.clone(), tx);

        tracing::debug!(connection_id = %connection_id, "WebSocket client connected");

        (connection_id, rx)
    }

    /// Remove a connection when the client disconnects
    pub async fn disconnect(&self, connection_id: &str) {
        self.connections.write().await.remove(connection_id);
        tracing::debug!(connection_id = %connection_id, "WebSocket client disconnected");
    }

    /// Send a message to a specific connection
    pub async fn send_to(&self, connection_id: &str, message: ServerMessage) {
        let connections = self.connections.read().await;
        if let Some(tx) = connections.get(connection_id) {
            // If send fails, the receiver is dropped (client disconnected)
            let _ = tx.send(message);
        }
    }

    /// Answer a `request_products` with the newest products
    pub async fn send_recent_products(&self, connection_id: &str) {
        let limit = self.catalog.config().recent_limit;
        let message = match self.catalog.recent(limit).await {
            Ok(products) => ServerMessage::Products { products },
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "failed to load products");
                ServerMessage::Error {
                    message: "failed to load products".to_string(),
                }
            }
        };
        self.send_to(connection_id, message).await;
    }

    /// Dispatch an event to every connection
    async fn dispatch_event(&self, envelope: &EventEnvelope) {
        let connections = self.connections.read().await;

        for (connection_id, tx) in connections.iter() {
            let message = ServerMessage::Event {
                data: envelope.clone(),
            };
            if tx.send(message).is_err() {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Failed to send event to connection (likely disconnected)"
                );
            }
        }
    }

    /// Run the event dispatch loop
    ///
    /// Receives events from the `EventBus` broadcast channel and dispatches
    /// them to every connection. Should be spawned as a background task; exits
    /// when the EventBus is dropped.
    pub async fn run_dispatch_loop(&self, mut rx: broadcast::Receiver<EventEnvelope>) {
        tracing::info!("WebSocket dispatch loop started");

        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    self.dispatch_event(&envelope).await;
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!(count, "WebSocket dispatch loop lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("EventBus closed, stopping WebSocket dispatch loop");
                    break;
                }
            }
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::core::events::{CatalogEvent, EventBus};
    use crate::core::ProductDraft;
    use crate::storage::InMemoryProductStore;
    use std::time::Duration;

    fn catalog() -> Arc<CatalogService> {
        Arc::new(CatalogService::new(
            Arc::new(InMemoryProductStore::new()),
            CatalogConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let cm = ConnectionManager::new(catalog());

        let (conn_id, _rx) = cm.connect().await;
        assert!(conn_id.starts_with("conn_"));
        assert_eq!(cm.connection_count().await, 1);

        cm.disconnect(&conn_id).await;
        assert_eq!(cm.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_dispatch_reaches_every_connection() {
        let cm = ConnectionManager::new(catalog());
        let (_c1, mut rx1) = cm.connect().await;
        let (_c2, mut rx2) = cm.connect().await;

        let envelope = EventEnvelope::new(CatalogEvent::ProductDeleted {
            product_id: Uuid::new_v4(),
        });
        cm.dispatch_event(&envelope).await;

        for rx in [&mut rx1, &mut rx2] {
            match rx.try_recv().expect("connection should receive event") {
                ServerMessage::Event { data } => assert_eq!(data.id, envelope.id),
                other => panic!("Expected Event message, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_with_event_bus() {
        let cm = Arc::new(ConnectionManager::new(catalog()));
        let (_conn_id, mut rx) = cm.connect().await;

        let event_bus = EventBus::new(16);
        let bus_rx = event_bus.subscribe();

        let cm_clone = cm.clone();
        let handle = tokio::spawn(async move {
            cm_clone.run_dispatch_loop(bus_rx).await;
        });

        let product_id = Uuid::new_v4();
        event_bus.publish(CatalogEvent::ProductDeleted { product_id });

        let msg = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Channel closed");

        match msg {
            ServerMessage::Event { data } => {
                assert_eq!(data.event.product_id(), Some(product_id));
            }
            other => panic!("Expected Event message, got {:?}", other),
        }

        drop(event_bus);
        let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
    }

    #[tokio::test]
    async fn test_send_recent_products() {
        let catalog = catalog();
        catalog
            .add(ProductDraft {
                title: Some("Lamp".to_string()),
                description: Some("Bright".to_string()),
                code: Some("L-1".to_string()),
                price: Some(12.0),
                category: Some("home".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let cm = ConnectionManager::new(catalog);
        let (conn_id, mut rx) = cm.connect().await;
        cm.send_recent_products(&conn_id).await;

        match rx.try_recv().unwrap() {
            ServerMessage::Products { products } => {
                assert_eq!(products.len(), 1);
                assert_eq!(products[0].code, "L-1");
            }
            other => panic!("Expected Products message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dead_connection_handling() {
        let cm = ConnectionManager::new(catalog());
        let (_conn_id, rx) = cm.connect().await;
        drop(rx);

        let envelope = EventEnvelope::new(CatalogEvent::CatalogSnapshot { products: vec![] });
        cm.dispatch_event(&envelope).await;

        // Connection is still registered (cleanup happens on disconnect)
        assert_eq!(cm.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_send_to_nonexistent_connection() {
        let cm = ConnectionManager::new(catalog());
        cm.send_to("conn_does_not_exist", ServerMessage::Pong).await;
        assert_eq!(cm.connection_count().await, 0);
    }
}
