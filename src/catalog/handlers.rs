//! HTTP handlers for `/api/products`

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

use crate::catalog::service::{CatalogQueryOutcome, CatalogService};
use crate::core::extractors::{JsonBody, Success, parse_id};
use crate::core::{ProductDraft, ProductPatch, RawParams, ShopError, StockFilter, ValidationError};

pub type CatalogState = Arc<CatalogService>;

/// Build the product API routes
///
/// - GET    /api/products                              - Filtered, paginated listing
/// - POST   /api/products                              - Create a product
/// - GET    /api/products/recent                       - Newest first
/// - GET    /api/products/category/{category}          - By category, cheapest first
/// - GET    /api/products/availability/{availability}  - By stock, best-stocked first
/// - GET    /api/products/{pid}                        - Get one product
/// - PUT    /api/products/{pid}                        - Partial update
/// - DELETE /api/products/{pid}                        - Delete
pub fn product_routes(state: CatalogState) -> Router {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/recent", get(recent_products))
        .route("/api/products/category/{category}", get(products_by_category))
        .route(
            "/api/products/availability/{availability}",
            get(products_by_availability),
        )
        .route(
            "/api/products/{pid}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

/// GET /api/products?limit&page&sort&category|status|stock|query
pub async fn list_products(
    State(catalog): State<CatalogState>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = RawParams::parse(query.as_deref().unwrap_or_default());
    let base = catalog.config().api_base_path.clone();

    let outcome = catalog.query(&params, &base).await;
    let status = match outcome {
        CatalogQueryOutcome::Success(_) => StatusCode::OK,
        CatalogQueryOutcome::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(outcome)).into_response()
}

pub async fn get_product(
    State(catalog): State<CatalogState>,
    Path(pid): Path<String>,
) -> Result<Response, ShopError> {
    let id = parse_id("product", &pid)?;
    let product = catalog.get(&id).await?;
    Ok(Success::new(product).into_response())
}

pub async fn create_product(
    State(catalog): State<CatalogState>,
    JsonBody(draft): JsonBody<ProductDraft>,
) -> Result<Response, ShopError> {
    let product = catalog.add(draft).await?;
    Ok((StatusCode::CREATED, Success::new(product)).into_response())
}

pub async fn update_product(
    State(catalog): State<CatalogState>,
    Path(pid): Path<String>,
    JsonBody(patch): JsonBody<ProductPatch>,
) -> Result<Response, ShopError> {
    let id = parse_id("product", &pid)?;
    let product = catalog.update(&id, patch).await?;
    Ok(Success::new(product).into_response())
}

pub async fn delete_product(
    State(catalog): State<CatalogState>,
    Path(pid): Path<String>,
) -> Result<Response, ShopError> {
    let id = parse_id("product", &pid)?;
    catalog.delete(&id).await?;
    Ok(Success::new(id).with_message("product deleted").into_response())
}

/// GET /api/products/recent?limit
pub async fn recent_products(
    State(catalog): State<CatalogState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ShopError> {
    let limit = listing_limit(&catalog, query.as_deref());
    let products = catalog.recent(limit).await?;
    Ok(Success::new(products).into_response())
}

/// GET /api/products/category/{category}?limit
pub async fn products_by_category(
    State(catalog): State<CatalogState>,
    Path(category): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ShopError> {
    let limit = listing_limit(&catalog, query.as_deref());
    let products = catalog.by_category(&category, limit).await?;
    Ok(Success::new(products).into_response())
}

/// GET /api/products/availability/{available|unavailable}?limit
pub async fn products_by_availability(
    State(catalog): State<CatalogState>,
    Path(availability): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ShopError> {
    let stock = StockFilter::parse(&availability).ok_or_else(|| {
        ValidationError::field("availability", "must be 'available' or 'unavailable'")
    })?;
    let limit = listing_limit(&catalog, query.as_deref());
    let products = catalog.by_availability(stock, limit).await?;
    Ok(Success::new(products).into_response())
}

fn listing_limit(catalog: &CatalogService, query: Option<&str>) -> usize {
    let params = RawParams::parse(query.unwrap_or_default());
    params
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(catalog.config().default_limit)
}
