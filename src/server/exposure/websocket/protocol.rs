//! WebSocket message protocol definitions
//!
//! Defines the JSON messages exchanged between WebSocket clients and the server.
//!
//! ## Client → Server Messages
//!
//! ```json
//! // Ask for the newest products
//! {"type": "request_products"}
//!
//! // Keepalive
//! {"type": "ping"}
//! ```
//!
//! ## Server → Client Messages
//!
//! ```json
//! // Sent once after the upgrade
//! {"type": "welcome", "connection_id": "conn_..."}
//!
//! // Catalog event notification
//! {"type": "event", "data": {"id": "...", "timestamp": "...", "event": {"event": "product_added", "product": {...}}}}
//!
//! // Answer to request_products
//! {"type": "products", "products": [...]}
//!
//! // Keepalive response
//! {"type": "pong"}
//!
//! // Error
//! {"type": "error", "message": "failed to load products"}
//! ```

use crate::core::events::EventEnvelope;
use crate::core::product::Product;
use serde::{Deserialize, Serialize};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the newest products
    RequestProducts,
    /// Keepalive ping
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Welcome message on connection
    Welcome {
        /// Unique connection ID
        connection_id: String,
    },
    /// A catalog event
    Event {
        /// The event envelope with metadata
        data: EventEnvelope,
    },
    /// Answer to `request_products`, newest first
    Products { products: Vec<Product> },
    /// Keepalive response
    Pong,
    /// Error message
    Error {
        /// Human-readable error description
        message: String,
    },
}
