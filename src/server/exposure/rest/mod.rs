//! REST exposure
//!
//! Consumes a `ServerHost` and produces an Axum `Router` with the health
//! checks, the product and cart APIs, and the HTML views.

use super::super::host::ServerHost;
use crate::carts::cart_routes;
use crate::catalog::product_routes;
use crate::views::{ViewState, view_routes};
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Returns a router with:
    /// - Health check routes
    /// - `/api/products` and `/api/carts`
    /// - HTML views
    /// - Custom routes
    ///
    /// wrapped in a request trace layer and a permissive CORS layer.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let view_state = ViewState {
            views: host.views.clone(),
            catalog: host.catalog.clone(),
            carts: host.carts.clone(),
        };

        let mut app = Self::health_routes()
            .merge(product_routes(host.catalog.clone()))
            .merge(cart_routes(host.carts.clone()))
            .merge(view_routes(view_state));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Ok(app.layer(cors).layer(TraceLayer::new_for_http()))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "storefront"
        }))
    }
}
