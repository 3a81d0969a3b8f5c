//! Server module: host state, builder and protocol exposures
//!
//! - `ServerHost` holds the services every exposure shares
//! - `ServerBuilder` wires stores and configuration into a host and serves it
//! - `exposure` turns a host into routers (REST + views, WebSocket)

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::{ServerBuilder, open_stores};
pub use exposure::RestExposure;
#[cfg(feature = "websocket")]
pub use exposure::WebSocketExposure;
pub use host::ServerHost;
