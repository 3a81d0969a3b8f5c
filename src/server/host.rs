//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` holds every piece of process-wide state (configuration, the
//! catalog and cart services, compiled views and the optional event bus).
//! Exposures consume it to build their routers.

use crate::carts::CartService;
use crate::catalog::CatalogService;
use crate::config::ShopConfig;
use crate::core::events::EventBus;
use crate::core::{CartStore, ProductStore};
use crate::views::Views;
use anyhow::Result;
use std::sync::Arc;

/// Host context containing all application state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerHost::from_stores(config, products, carts)?);
///
/// let rest_app = RestExposure::build_router(host.clone(), vec![])?;
/// let ws_app = WebSocketExposure::build_router(host)?;
/// ```
pub struct ServerHost {
    pub config: Arc<ShopConfig>,

    pub catalog: Arc<CatalogService>,

    pub carts: Arc<CartService>,

    pub views: Arc<Views>,

    /// Optional event bus for the live product feed
    ///
    /// When present, catalog mutations publish to it and the WebSocket
    /// exposure subscribes to it.
    pub event_bus: Option<Arc<EventBus>>,
}

impl ServerHost {
    /// Build the host from configured stores
    ///
    /// The event bus is created here unless `events.capacity` is 0.
    pub fn from_stores(
        config: ShopConfig,
        products: Arc<dyn ProductStore>,
        carts: Arc<dyn CartStore>,
    ) -> Result<Self> {
        let event_bus = (config.events.capacity > 0)
            .then(|| Arc::new(EventBus::new(config.events.capacity)));

        let mut catalog = CatalogService::new(products.clone(), config.catalog.clone());
        if let Some(bus) = &event_bus {
            catalog = catalog.with_event_bus(bus.clone());
        }

        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            carts: Arc::new(CartService::new(carts, products)),
            views: Arc::new(Views::new()?),
            event_bus,
        })
    }

    /// Get a reference to the event bus (if configured)
    pub fn event_bus(&self) -> Option<&Arc<EventBus>> {
        self.event_bus.as_ref()
    }
}
