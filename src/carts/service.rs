//! Cart service
//!
//! Every read-modify-write on a cart runs under that cart's own async mutex,
//! so concurrent additions to one cart never overwrite each other while
//! unrelated carts proceed in parallel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::core::{
    Cart, CartStore, CartSummary, LineItem, ProductStore, ResolvedLine, ShopError,
    ValidationError, resolve_lines, summarize,
};

/// A line as submitted by a client
#[derive(Debug, Clone, Deserialize)]
pub struct LineInput {
    pub product: String,
    pub quantity: i64,
}

/// A cart with every line resolved and its totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub id: Uuid,
    pub products: Vec<ResolvedLine>,
    pub summary: CartSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate a client-supplied quantity
pub fn positive_quantity(quantity: i64) -> Result<u32, ValidationError> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(ValidationError::quantity)
}

pub struct CartService {
    carts: Arc<dyn CartStore>,
    products: Arc<dyn ProductStore>,
    locks: LockTable,
}

type LockTable = Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>;

/// Held for the duration of one cart mutation. The table entry is removed on
/// drop once no other task holds or awaits the same lock.
struct CartLock<'a> {
    table: &'a LockTable,
    cart_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for CartLock<'_> {
    fn drop(&mut self) {
        let mut locks = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // release before counting, the guard owns a clone of the Arc
        self.guard.take();
        if locks
            .get(&self.cart_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.cart_id);
        }
    }
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, products: Arc<dyn ProductStore>) -> Self {
        Self {
            carts,
            products,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create(&self) -> Result<Cart, ShopError> {
        let cart = self.carts.insert(Cart::new()).await?;
        tracing::info!(cart_id = %cart.id, "cart created");
        Ok(cart)
    }

    pub async fn get(&self, id: &Uuid) -> Result<Cart, ShopError> {
        self.carts
            .get(id)
            .await?
            .ok_or_else(|| ShopError::cart_not_found(*id))
    }

    /// The cart with lines resolved against the live catalog
    pub async fn view(&self, id: &Uuid) -> Result<CartView, ShopError> {
        let cart = self.get(id).await?;
        self.resolve(cart).await
    }

    /// Add `quantity` units of a product, incrementing an existing line
    pub async fn add_product(
        &self,
        cart_id: &Uuid,
        product_id: &Uuid,
        quantity: i64,
    ) -> Result<CartView, ShopError> {
        let quantity = positive_quantity(quantity)?;
        let _guard = self.lock(cart_id).await;

        let mut cart = self.get(cart_id).await?;
        self.ensure_product(product_id).await?;
        cart.add(*product_id, quantity);

        let cart = self.save(cart).await?;
        tracing::debug!(cart_id = %cart_id, product_id = %product_id, quantity, "product added to cart");
        self.resolve(cart).await
    }

    pub async fn remove_product(
        &self,
        cart_id: &Uuid,
        product_id: &Uuid,
    ) -> Result<CartView, ShopError> {
        let _guard = self.lock(cart_id).await;

        let mut cart = self.get(cart_id).await?;
        if !cart.remove(product_id) {
            return Err(ShopError::NotInCart {
                cart_id: *cart_id,
                product_id: *product_id,
            });
        }

        let cart = self.save(cart).await?;
        self.resolve(cart).await
    }

    /// Replace every line; each product must exist and repeats are merged
    pub async fn replace_products(
        &self,
        cart_id: &Uuid,
        lines: Vec<LineInput>,
    ) -> Result<CartView, ShopError> {
        let mut parsed = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = crate::core::extractors::parse_id("product", &line.product)?;
            let quantity = positive_quantity(line.quantity)?;
            parsed.push(LineItem { product, quantity });
        }

        let _guard = self.lock(cart_id).await;
        let mut cart = self.get(cart_id).await?;
        for line in &parsed {
            self.ensure_product(&line.product).await?;
        }
        cart.replace(parsed);

        let cart = self.save(cart).await?;
        self.resolve(cart).await
    }

    /// Overwrite the quantity of a line already in the cart
    pub async fn update_quantity(
        &self,
        cart_id: &Uuid,
        product_id: &Uuid,
        quantity: i64,
    ) -> Result<CartView, ShopError> {
        let quantity = positive_quantity(quantity)?;
        let _guard = self.lock(cart_id).await;

        let mut cart = self.get(cart_id).await?;
        if !cart.set_quantity(product_id, quantity) {
            return Err(ShopError::NotInCart {
                cart_id: *cart_id,
                product_id: *product_id,
            });
        }

        let cart = self.save(cart).await?;
        self.resolve(cart).await
    }

    /// Drop every line; the cart itself remains
    pub async fn clear(&self, cart_id: &Uuid) -> Result<CartView, ShopError> {
        let _guard = self.lock(cart_id).await;

        let mut cart = self.get(cart_id).await?;
        cart.clear();

        let cart = self.save(cart).await?;
        tracing::debug!(cart_id = %cart_id, "cart cleared");
        self.resolve(cart).await
    }

    async fn lock(&self, cart_id: &Uuid) -> CartLock<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(*cart_id).or_default().clone()
        };
        CartLock {
            table: &self.locks,
            cart_id: *cart_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    async fn ensure_product(&self, product_id: &Uuid) -> Result<(), ShopError> {
        match self.products.get(product_id).await? {
            Some(_) => Ok(()),
            None => Err(ShopError::product_not_found(*product_id)),
        }
    }

    async fn save(&self, cart: Cart) -> Result<Cart, ShopError> {
        let id = cart.id;
        self.carts
            .put(cart)
            .await?
            .ok_or_else(|| ShopError::cart_not_found(id))
    }

    async fn resolve(&self, cart: Cart) -> Result<CartView, ShopError> {
        let ids: Vec<Uuid> = cart.products.iter().map(|l| l.product).collect();
        let catalog = self
            .products
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect::<HashMap<_, _>>();

        let products = resolve_lines(&cart, &catalog);
        let summary = summarize(&products);

        Ok(CartView {
            id: cart.id,
            products,
            summary,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        })
    }
}
