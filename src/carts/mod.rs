//! Shopping carts: line-item mutation and aggregated views

pub mod handlers;
pub mod service;

pub use handlers::{CartState, cart_routes};
pub use service::{CartService, CartView, LineInput};
