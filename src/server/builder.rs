//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::{ShopConfig, StorageConfig};
use crate::core::{CartStore, ProductStore};
use crate::storage::{FileCartStore, FileProductStore, InMemoryCartStore, InMemoryProductStore};
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the storefront server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ShopConfig::from_env()?)
///     .with_configured_storage()
///     .await?
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: ShopConfig,
    products: Option<Arc<dyn ProductStore>>,
    carts: Option<Arc<dyn CartStore>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: ShopConfig::default(),
            products: None,
            carts: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ShopConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the product store (required unless `with_configured_storage` is used)
    pub fn with_product_store(mut self, store: impl ProductStore + 'static) -> Self {
        self.products = Some(Arc::new(store));
        self
    }

    /// Set the cart store (required unless `with_configured_storage` is used)
    pub fn with_cart_store(mut self, store: impl CartStore + 'static) -> Self {
        self.carts = Some(Arc::new(store));
        self
    }

    /// Use stores that are already opened and shared elsewhere
    pub fn with_stores(mut self, products: Arc<dyn ProductStore>, carts: Arc<dyn CartStore>) -> Self {
        self.products = Some(products);
        self.carts = Some(carts);
        self
    }

    /// Use the in-memory stores
    pub fn with_in_memory_storage(self) -> Self {
        self.with_product_store(InMemoryProductStore::new())
            .with_cart_store(InMemoryCartStore::new())
    }

    /// Open the stores named by the configuration's `storage` section
    ///
    /// Stores set explicitly beforehand are kept.
    pub async fn with_configured_storage(mut self) -> Result<Self> {
        let (products, carts) = open_stores(&self.config.storage).await?;
        self.products.get_or_insert(products);
        self.carts.get_or_insert(carts);
        Ok(self)
    }

    /// Add custom routes to the server
    ///
    /// # Example
    ///
    /// ```ignore
    /// let admin = Router::new().route("/admin/reindex", post(reindex));
    ///
    /// ServerBuilder::new()
    ///     .with_in_memory_storage()
    ///     .with_custom_routes(admin)
    ///     .build()?;
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<ServerHost> {
        let products = self.products.ok_or_else(|| {
            anyhow!("A product store is required. Call .with_product_store() or .with_configured_storage()")
        })?;
        let carts = self.carts.ok_or_else(|| {
            anyhow!("A cart store is required. Call .with_cart_store() or .with_configured_storage()")
        })?;

        ServerHost::from_stores(self.config, products, carts)
    }

    /// Build the final router: REST API, views and (with the `websocket`
    /// feature) the live feed
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Self::expose(host, custom_routes)
    }

    fn expose(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let app = RestExposure::build_router(host.clone(), custom_routes)?;

        #[cfg(feature = "websocket")]
        let app = app.merge(super::exposure::WebSocketExposure::build_router(host)?);

        Ok(app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to `server.host:server.port` from the configuration and handles
    /// SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(mut self) -> Result<()> {
        let addr = self.config.server.socket_addr()?;
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let app = Self::expose(host, custom_routes)?;

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the product and cart stores for a storage configuration
pub async fn open_stores(
    storage: &StorageConfig,
) -> Result<(Arc<dyn ProductStore>, Arc<dyn CartStore>)> {
    match storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory storage");
            Ok((
                Arc::new(InMemoryProductStore::new()),
                Arc::new(InMemoryCartStore::new()),
            ))
        }
        StorageConfig::File { dir } => {
            tracing::info!(dir = %dir.display(), "using file storage");
            Ok((
                Arc::new(FileProductStore::open(dir).await?),
                Arc::new(FileCartStore::open(dir).await?),
            ))
        }
        #[cfg(feature = "mongodb_backend")]
        StorageConfig::Mongodb { uri, database } => {
            use crate::storage::{MongoCartStore, MongoProductStore};

            tracing::info!(database = %database, "using MongoDB storage");
            let client = mongodb::Client::with_uri_str(uri).await?;
            let db = client.database(database);
            Ok((
                Arc::new(MongoProductStore::open(db.clone()).await?),
                Arc::new(MongoCartStore::new(db)),
            ))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        StorageConfig::Mongodb { .. } => Err(anyhow!(
            "MongoDB storage requires the `mongodb_backend` feature"
        )),
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
