//! Catalog event bus for the live product feed
//!
//! The EventBus uses `tokio::sync::broadcast` to decouple catalog mutations
//! (REST handlers via [`CatalogService`](crate::catalog::CatalogService)) from
//! delivery (WebSocket connections).
//!
//! # Architecture
//!
//! ```text
//! POST/PUT/DELETE /api/products ──▶ CatalogService ──▶ EventBus::publish() ──▶ WebSocket clients
//! ```
//!
//! Every mutation publishes two events: the mutation itself
//! (`product_added`, `product_updated`, `product_deleted`) followed by a
//! `catalog_snapshot` carrying the full current catalog.
//!
//! # Usage
//!
//! ```rust,ignore
//! let event_bus = EventBus::new(1024);
//! let mut rx = event_bus.subscribe();
//!
//! event_bus.publish(CatalogEvent::ProductDeleted { product_id });
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("Received: {}", envelope.event.name());
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::product::Product;

/// Something that happened to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CatalogEvent {
    ProductAdded { product: Product },
    ProductUpdated { product: Product },
    ProductDeleted { product_id: Uuid },
    /// Full catalog after a mutation, in store-default order
    CatalogSnapshot { products: Vec<Product> },
}

impl CatalogEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEvent::ProductAdded { .. } => "product_added",
            CatalogEvent::ProductUpdated { .. } => "product_updated",
            CatalogEvent::ProductDeleted { .. } => "product_deleted",
            CatalogEvent::CatalogSnapshot { .. } => "catalog_snapshot",
        }
    }

    /// The product this event is about, if it concerns a single one
    pub fn product_id(&self) -> Option<Uuid> {
        match self {
            CatalogEvent::ProductAdded { product } | CatalogEvent::ProductUpdated { product } => {
                Some(product.id)
            }
            CatalogEvent::ProductDeleted { product_id } => Some(*product_id),
            CatalogEvent::CatalogSnapshot { .. } => None,
        }
    }
}

/// Envelope wrapping a catalog event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: CatalogEvent,
}

impl EventEnvelope {
    pub fn new(event: CatalogEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone (the sender is reference-counted) and shared across tasks.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never blocks and never fails. Returns the number of receivers that
    /// will see the event (0 when nobody is listening).
    pub fn publish(&self, event: CatalogEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
