//! # Storefront
//!
//! A product catalog and shopping cart backend built on axum.
//!
//! ## Features
//!
//! - **Catalog listing**: filter by category, status or stock (or one overloaded
//!   `query` parameter), sort by price, paginate, and get `prevLink`/`nextLink`
//!   URLs that preserve the caller's parameters
//! - **Carts**: line items resolved against live products with computed totals
//! - **Pluggable storage**: in-memory, flat JSON files, or MongoDB
//!   (`mongodb_backend` feature)
//! - **Views**: server-rendered HTML pages via tera
//! - **Live feed**: catalog events pushed over WebSocket (`websocket` feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_config(ShopConfig::from_env()?)
//!         .with_configured_storage()
//!         .await?
//!         .serve()
//!         .await
//! }
//! ```

pub mod carts;
pub mod catalog;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod views;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        Cart, CartStore, CartSummary, CatalogEvent, CatalogFilter, EventBus, EventEnvelope,
        LineItem, PageLinks, PaginationMeta, Product, ProductDraft, ProductPatch, ProductStore,
        RawParams, ShopError, StockFilter, StoreError, StoreResult, ValidationError,
    };

    // === Services ===
    pub use crate::carts::{CartService, CartView};
    pub use crate::catalog::{CatalogQueryOutcome, CatalogService, PageResult};

    // === Storage ===
    pub use crate::storage::{
        FileCartStore, FileProductStore, InMemoryCartStore, InMemoryProductStore,
    };
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::{MongoCartStore, MongoProductStore};

    // === Config ===
    pub use crate::config::{ShopConfig, StorageConfig};

    // === Server ===
    pub use crate::server::{RestExposure, ServerBuilder, ServerHost};
    #[cfg(feature = "websocket")]
    pub use crate::server::WebSocketExposure;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use uuid::Uuid;
}
