//! Shared test harness for store backends
//!
//! Every backend must satisfy the same [`ProductStore`] and [`CartStore`]
//! contract. A test file opens its backend inside a [`StoreFixture`] and hands
//! the expression to `store_contract_tests!`:
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//!
//! store_contract_tests!(StoreFixture::in_memory());
//! ```
//!
//! The expression is expanded inside each async test, so it may `.await`.

#![allow(dead_code)]

#[macro_use]
mod contract_tests;

use std::any::Any;
use std::sync::Arc;

use chrono::{Duration, Utc};
use storefront::core::{Cart, CartStore, Product, ProductStore};
use storefront::storage::{InMemoryCartStore, InMemoryProductStore};
use uuid::Uuid;

/// A pair of stores plus whatever keeps their backing resource alive
pub struct StoreFixture {
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    _guard: Option<Box<dyn Any + Send>>,
}

impl StoreFixture {
    pub fn new(products: Arc<dyn ProductStore>, carts: Arc<dyn CartStore>) -> Self {
        Self {
            products,
            carts,
            _guard: None,
        }
    }

    /// Keep `guard` (a temp dir, a container handle...) alive with the stores
    pub fn with_guard(mut self, guard: impl Any + Send) -> Self {
        self._guard = Some(Box::new(guard));
        self
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryProductStore::new()),
            Arc::new(InMemoryCartStore::new()),
        )
    }
}

// ============================================================================
// Builders
// ============================================================================

/// A valid product; `seq` orders creation times so insertion order is stable
pub fn product(code: &str, category: &str, price: f64, stock: u32, seq: i64) -> Product {
    let created = Utc::now() - Duration::seconds(3600) + Duration::milliseconds(seq);
    Product {
        id: Uuid::new_v4(),
        title: format!("Product {}", code),
        description: format!("Description of {}", code),
        code: code.to_string(),
        price,
        stock,
        category: category.to_string(),
        status: true,
        thumbnails: Vec::new(),
        created_at: created,
        updated_at: created,
    }
}

pub fn inactive(mut product: Product) -> Product {
    product.status = false;
    product
}

/// Six products across three categories, in insertion order:
///
/// | code | category     | price | stock | status |
/// |------|--------------|-------|-------|--------|
/// | S1   | shoes        | 50    | 3     | true   |
/// | S2   | Shoes-Trail  | 20    | 0     | true   |
/// | S3   | shoes        | 80    | 7     | false  |
/// | H1   | hats         | 15    | 0     | true   |
/// | H2   | hats         | 35    | 2     | true   |
/// | B1   | bags         | 60    | 1     | false  |
pub fn sample_catalog() -> Vec<Product> {
    vec![
        product("S1", "shoes", 50.0, 3, 1),
        product("S2", "Shoes-Trail", 20.0, 0, 2),
        inactive(product("S3", "shoes", 80.0, 7, 3)),
        product("H1", "hats", 15.0, 0, 4),
        product("H2", "hats", 35.0, 2, 5),
        inactive(product("B1", "bags", 60.0, 1, 6)),
    ]
}

pub async fn seed(store: &dyn ProductStore, products: Vec<Product>) -> Vec<Product> {
    let mut inserted = Vec::with_capacity(products.len());
    for p in products {
        inserted.push(store.insert(p).await.unwrap());
    }
    inserted
}

pub fn cart_with(lines: &[(Uuid, u32)]) -> Cart {
    let mut cart = Cart::new();
    for (product, quantity) in lines {
        cart.add(*product, *quantity);
    }
    cart
}

// ============================================================================
// Assertions
// ============================================================================

pub fn codes(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.code.as_str()).collect()
}

pub fn assert_codes(products: &[Product], expected: &[&str]) {
    assert_eq!(codes(products), expected, "unexpected product codes");
}
