//! HTTP handlers for `/api/carts`

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::carts::service::{CartService, LineInput};
use crate::core::extractors::{JsonBody, Success, parse_id};
use crate::core::{ShopError, ValidationError};

pub type CartState = Arc<CartService>;

/// Body of the add and update-quantity endpoints
#[derive(Debug, Default, Deserialize)]
pub struct QuantityBody {
    pub quantity: Option<i64>,
}

/// Body of `PUT /api/carts/{cid}`
#[derive(Debug, Deserialize)]
pub struct ReplaceLinesBody {
    pub products: Vec<LineInput>,
}

/// Build the cart API routes
///
/// - POST   /api/carts                        - Create an empty cart
/// - GET    /api/carts/{cid}                  - Cart with lines resolved and totals
/// - PUT    /api/carts/{cid}                  - Replace every line
/// - DELETE /api/carts/{cid}                  - Remove every line
/// - POST   /api/carts/{cid}/product/{pid}    - Add units of a product
/// - PUT    /api/carts/{cid}/products/{pid}   - Set a line's quantity
/// - DELETE /api/carts/{cid}/products/{pid}   - Remove a line
pub fn cart_routes(state: CartState) -> Router {
    Router::new()
        .route("/api/carts", post(create_cart))
        .route(
            "/api/carts/{cid}",
            axum::routing::get(get_cart).put(replace_products).delete(clear_cart),
        )
        .route("/api/carts/{cid}/product/{pid}", post(add_product))
        .route(
            "/api/carts/{cid}/products/{pid}",
            put(update_quantity).delete(remove_product),
        )
        .with_state(state)
}

pub async fn create_cart(State(carts): State<CartState>) -> Result<Response, ShopError> {
    let cart = carts.create().await?;
    let view = carts.view(&cart.id).await?;
    Ok((StatusCode::CREATED, Success::new(view)).into_response())
}

pub async fn get_cart(
    State(carts): State<CartState>,
    Path(cid): Path<String>,
) -> Result<Response, ShopError> {
    let cid = parse_id("cart", &cid)?;
    Ok(Success::new(carts.view(&cid).await?).into_response())
}

/// POST /api/carts/{cid}/product/{pid}
///
/// The body is optional; a missing body or `quantity` adds one unit.
pub async fn add_product(
    State(carts): State<CartState>,
    Path((cid, pid)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ShopError> {
    let cid = parse_id("cart", &cid)?;
    let pid = parse_id("product", &pid)?;
    let quantity = optional_body::<QuantityBody>(&body)?.quantity.unwrap_or(1);

    let view = carts.add_product(&cid, &pid, quantity).await?;
    Ok(Success::new(view).into_response())
}

pub async fn remove_product(
    State(carts): State<CartState>,
    Path((cid, pid)): Path<(String, String)>,
) -> Result<Response, ShopError> {
    let cid = parse_id("cart", &cid)?;
    let pid = parse_id("product", &pid)?;
    Ok(Success::new(carts.remove_product(&cid, &pid).await?).into_response())
}

pub async fn replace_products(
    State(carts): State<CartState>,
    Path(cid): Path<String>,
    JsonBody(body): JsonBody<ReplaceLinesBody>,
) -> Result<Response, ShopError> {
    let cid = parse_id("cart", &cid)?;
    let view = carts.replace_products(&cid, body.products).await?;
    Ok(Success::new(view).into_response())
}

pub async fn update_quantity(
    State(carts): State<CartState>,
    Path((cid, pid)): Path<(String, String)>,
    JsonBody(body): JsonBody<QuantityBody>,
) -> Result<Response, ShopError> {
    let cid = parse_id("cart", &cid)?;
    let pid = parse_id("product", &pid)?;
    let quantity = body.quantity.ok_or_else(ValidationError::quantity)?;

    let view = carts.update_quantity(&cid, &pid, quantity).await?;
    Ok(Success::new(view).into_response())
}

pub async fn clear_cart(
    State(carts): State<CartState>,
    Path(cid): Path<String>,
) -> Result<Response, ShopError> {
    let cid = parse_id("cart", &cid)?;
    let view = carts.clear(&cid).await?;
    Ok(Success::new(view).with_message("cart cleared").into_response())
}

fn optional_body<T: Default + for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, ShopError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ValidationError::Body(e.to_string()).into())
}
