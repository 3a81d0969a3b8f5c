//! View handlers
//!
//! - GET /                  - Home, every product
//! - GET /realtimeproducts  - Live list fed by the WebSocket channel
//! - GET /products          - Paginated catalog, same parameters as the API
//! - GET /products/{pid}    - Product detail
//! - GET /carts/{cid}       - Cart with totals

use axum::{
    Router,
    extract::{Path, RawQuery, State},
    response::{Html, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use crate::carts::{CartService, CartView};
use crate::catalog::{CatalogQueryOutcome, CatalogService};
use crate::core::extractors::parse_id;
use crate::core::{Product, RawParams, ShopError};
use crate::views::Views;

#[derive(Clone)]
pub struct ViewState {
    pub views: Arc<Views>,
    pub catalog: Arc<CatalogService>,
    pub carts: Arc<CartService>,
}

pub fn view_routes(state: ViewState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/realtimeproducts", get(realtime_products))
        .route("/products", get(products))
        .route("/products/{pid}", get(product_detail))
        .route("/carts/{cid}", get(cart_detail))
        .with_state(state)
}

pub async fn home(State(state): State<ViewState>) -> Response {
    let products = snapshot_or_empty(&state.catalog).await;
    let mut context = Context::new();
    context.insert("products", &products);
    state.views.respond(state.views.render("home.html", &context))
}

pub async fn realtime_products(State(state): State<ViewState>) -> Response {
    let products = snapshot_or_empty(&state.catalog).await;
    let mut context = Context::new();
    context.insert("products", &products);
    state
        .views
        .respond(state.views.render("realtime_products.html", &context))
}

pub async fn products(State(state): State<ViewState>, RawQuery(query): RawQuery) -> Response {
    let params = RawParams::parse(query.as_deref().unwrap_or_default());
    let base = state.catalog.config().view_base_path.clone();

    let mut context = Context::new();
    match state.catalog.query(&params, &base).await {
        CatalogQueryOutcome::Success(page) => {
            context.insert("page", &page);
            context.insert("error", &None::<String>);
        }
        CatalogQueryOutcome::Error { message } => {
            context.insert("page", &None::<()>);
            context.insert("error", &message);
        }
    }
    state.views.respond(state.views.render("products.html", &context))
}

pub async fn product_detail(State(state): State<ViewState>, Path(pid): Path<String>) -> Response {
    let result: Result<Html<String>, ShopError> = async {
        let id = parse_id("product", &pid)?;
        let product = state.catalog.get(&id).await?;
        let mut context = Context::new();
        context.insert("product", &product);
        state.views.render("product.html", &context)
    }
    .await;
    state.views.respond(result)
}

/// A resolved cart line with its subtotal pre-formatted
#[derive(Serialize)]
struct CartLine<'a> {
    product: Option<&'a Product>,
    quantity: u32,
    subtotal: String,
}

pub async fn cart_detail(State(state): State<ViewState>, Path(cid): Path<String>) -> Response {
    let result: Result<Html<String>, ShopError> = async {
        let id = parse_id("cart", &cid)?;
        let cart: CartView = state.carts.view(&id).await?;
        let lines: Vec<CartLine<'_>> = cart
            .products
            .iter()
            .map(|line| CartLine {
                product: line.product.as_ref(),
                quantity: line.quantity,
                subtotal: format!("{:.2}", line.subtotal()),
            })
            .collect();

        let mut context = Context::new();
        context.insert(
            "cart",
            &serde_json::json!({
                "id": cart.id,
                "products": lines,
                "summary": cart.summary,
            }),
        );
        state.views.render("cart.html", &context)
    }
    .await;
    state.views.respond(result)
}

/// Whole catalog; a store failure renders an empty list
async fn snapshot_or_empty(catalog: &CatalogService) -> Vec<Product> {
    catalog.snapshot().await.unwrap_or_else(|e| {
        tracing::warn!(error = ?e, "failed to load products for view");
        Vec::new()
    })
}
