//! In-memory stores for testing and development

use crate::core::error::{StoreError, StoreResult};
use crate::core::{
    Cart, CartStore, CatalogFilter, Page, PageRequest, Product, ProductPatch, ProductStore,
};
use anyhow::anyhow;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory product store
///
/// Keeps products in insertion order, which is the store-default sort.
/// Uses RwLock for thread-safe access; the `code` uniqueness check and the
/// write happen under the same write lock.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<IndexMap<Uuid, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject `code` if a product other than `except` already holds it
pub(crate) fn check_code_unique<'a>(
    mut products: impl Iterator<Item = &'a Product>,
    code: &str,
    except: Option<&Uuid>,
) -> StoreResult<()> {
    if products.any(|p| p.code == code && Some(&p.id) != except) {
        return Err(StoreError::Conflict {
            field: "code",
            value: code.to_string(),
        });
    }
    Ok(())
}

/// Filter, sort and slice an in-memory product list
pub(crate) fn run_query(
    products: impl Iterator<Item = Product>,
    filter: &CatalogFilter,
    request: &PageRequest,
) -> Page<Product> {
    let mut matched: Vec<Product> = products.filter(|p| filter.matches(p)).collect();
    if let Some(sort) = &request.sort {
        sort.sort(&mut matched);
    }
    Page::from_all(matched, request)
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn query(
        &self,
        filter: &CatalogFilter,
        request: &PageRequest,
    ) -> StoreResult<Page<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(run_query(products.values().cloned(), filter, request))
    }

    async fn get(&self, id: &Uuid) -> StoreResult<Option<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(products.get(id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn insert(&self, product: Product) -> StoreResult<Product> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        check_code_unique(products.values(), &product.code, None)?;
        products.insert(product.id, product.clone());

        Ok(product)
    }

    async fn update(&self, id: &Uuid, patch: ProductPatch) -> StoreResult<Option<Product>> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !products.contains_key(id) {
            return Ok(None);
        }
        if let Some(code) = &patch.code {
            check_code_unique(products.values(), code, Some(id))?;
        }

        let Some(product) = products.get_mut(id) else {
            return Ok(None);
        };
        product.apply(patch);

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: &Uuid) -> StoreResult<bool> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(products.shift_remove(id).is_some())
    }

    async fn all(&self) -> StoreResult<Vec<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(products.values().cloned().collect())
    }
}

/// In-memory cart store
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn insert(&self, cart: Cart) -> StoreResult<Cart> {
        let mut carts = self
            .carts
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn get(&self, id: &Uuid) -> StoreResult<Option<Cart>> {
        let carts = self
            .carts
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(carts.get(id).cloned())
    }

    async fn put(&self, cart: Cart) -> StoreResult<Option<Cart>> {
        let mut carts = self
            .carts
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match carts.get_mut(&cart.id) {
            Some(slot) => {
                *slot = cart.clone();
                Ok(Some(cart))
            }
            None => Ok(None),
        }
    }
}
