//! Store traits for products and carts
//!
//! The services are agnostic to the storage mechanism; every backend in
//! [`crate::storage`] implements both traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::cart::Cart;
use crate::core::error::StoreResult;
use crate::core::filter::CatalogFilter;
use crate::core::product::{Product, ProductPatch};
use crate::core::query::{Page, PageRequest};

/// Persistent product collection
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Filtered, sorted, paginated query. `total` counts every match.
    async fn query(&self, filter: &CatalogFilter, request: &PageRequest)
        -> StoreResult<Page<Product>>;

    /// Get a product by ID
    async fn get(&self, id: &Uuid) -> StoreResult<Option<Product>>;

    /// Resolve several products at once; unknown ids are omitted
    async fn get_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>>;

    /// Insert a new product
    ///
    /// Fails with [`StoreError::Conflict`](crate::core::error::StoreError::Conflict)
    /// when another product already holds the same `code`.
    async fn insert(&self, product: Product) -> StoreResult<Product>;

    /// Apply a partial update; `Ok(None)` when the product does not exist.
    /// Changing `code` to one held by another product is a conflict.
    async fn update(&self, id: &Uuid, patch: ProductPatch) -> StoreResult<Option<Product>>;

    /// Hard delete; returns whether a product was removed
    async fn delete(&self, id: &Uuid) -> StoreResult<bool>;

    /// Every product in store-default order
    async fn all(&self) -> StoreResult<Vec<Product>>;
}

/// Persistent cart collection
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn insert(&self, cart: Cart) -> StoreResult<Cart>;

    async fn get(&self, id: &Uuid) -> StoreResult<Option<Cart>>;

    /// Overwrite an existing cart; `Ok(None)` when it does not exist
    async fn put(&self, cart: Cart) -> StoreResult<Option<Cart>>;
}
