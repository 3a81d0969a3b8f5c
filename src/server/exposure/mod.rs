//! API exposures
//!
//! Each exposure consumes a `ServerHost` and produces a Router for its protocol.

pub mod rest;

pub use rest::RestExposure;

#[cfg(feature = "websocket")]
pub mod websocket;

#[cfg(feature = "websocket")]
pub use websocket::WebSocketExposure;
