//! MongoDB stores using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! storefront = { version = "0.3", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! Products live in the `products` collection with a unique index on `code`;
//! a duplicate-key write (server code 11000) is reported as
//! [`StoreError::Conflict`]. Carts live in `carts`, one document per cart with
//! its line items embedded.
//!
//! # Serialization strategy
//!
//! Records are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents, so UUIDs and timestamps are stored as
//! strings. The `id` field is mapped to MongoDB's `_id` convention. Products
//! also carry a numeric `created_seq` (creation time in nanoseconds) used for
//! store-default ordering, since RFC 3339 strings with variable precision do
//! not sort lexicographically.

use crate::core::error::{StoreError, StoreResult};
use crate::core::{
    Cart, CartStore, CatalogFilter, Page, PageRequest, Product, ProductPatch, ProductStore,
    SortField, StockFilter,
};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

const PRODUCTS: &str = "products";
const CARTS: &str = "carts";
const DUPLICATE_KEY: i32 = 11000;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Serialize a record into a BSON Document, renaming `id` → `_id`.
fn to_document<T: Serialize>(record: &T) -> anyhow::Result<Document> {
    let json = serde_json::to_value(record).map_err(|e| anyhow!("Failed to serialize: {}", e))?;
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a record, renaming `_id` → `id`.
fn from_document<T: DeserializeOwned>(mut doc: Document) -> anyhow::Result<T> {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }
    let json = Bson::Document(doc).into_relaxed_extjson();
    serde_json::from_value(json).map_err(|e| anyhow!("Failed to deserialize document: {}", e))
}

fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn backend(context: &str, err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(anyhow!("{}: {}", context, err))
}

/// Translate a catalog filter into a MongoDB query document
fn filter_document(filter: &CatalogFilter) -> Document {
    let mut query = Document::new();
    if let Some(category) = &filter.category {
        query.insert(
            "category",
            doc! { "$regex": regex::escape(category), "$options": "i" },
        );
    }
    if let Some(status) = filter.status {
        query.insert("status", status);
    }
    match filter.stock {
        Some(StockFilter::Available) => {
            query.insert("stock", doc! { "$gt": 0 });
        }
        Some(StockFilter::Unavailable) => {
            query.insert("stock", 0);
        }
        None => {}
    }
    query
}

fn sort_document(request: &PageRequest) -> Document {
    match request.sort {
        None => doc! { "created_seq": 1 },
        Some(sort) => {
            let direction = if sort.descending { -1 } else { 1 };
            let field = match sort.field {
                SortField::CreatedAt => "created_seq",
                other => other.as_str(),
            };
            let mut order = doc! { field: direction };
            if field != "created_seq" {
                order.insert("created_seq", 1);
            }
            order
        }
    }
}

fn product_document(product: &Product) -> anyhow::Result<Document> {
    let mut doc = to_document(product)?;
    let seq = product.created_at.timestamp_nanos_opt().unwrap_or(i64::MAX);
    doc.insert("created_seq", seq);
    Ok(doc)
}

fn set_document(patch: ProductPatch) -> Document {
    let mut set = Document::new();
    if let Some(title) = patch.title {
        set.insert("title", title);
    }
    if let Some(description) = patch.description {
        set.insert("description", description);
    }
    if let Some(code) = patch.code {
        set.insert("code", code);
    }
    if let Some(price) = patch.price {
        set.insert("price", price);
    }
    if let Some(stock) = patch.stock {
        set.insert("stock", stock);
    }
    if let Some(category) = patch.category {
        set.insert("category", category);
    }
    if let Some(status) = patch.status {
        set.insert("status", status);
    }
    if let Some(thumbnails) = patch.thumbnails {
        set.insert("thumbnails", thumbnails);
    }
    set.insert("updated_at", Utc::now().to_rfc3339());
    set
}

// ---------------------------------------------------------------------------
// MongoProductStore
// ---------------------------------------------------------------------------

/// Product store backed by MongoDB
///
/// # Example
///
/// ```rust,ignore
/// let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoProductStore::open(client.database("ecommerce")).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoProductStore {
    database: Database,
}

impl MongoProductStore {
    /// Wrap `database` and make sure the unique `code` index exists
    pub async fn open(database: Database) -> anyhow::Result<Self> {
        let store = Self { database };
        store.ensure_indexes().await?;
        Ok(store)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self) -> Collection<Document> {
        self.database.collection(PRODUCTS)
    }

    async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let unique_code = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection()
            .create_index(unique_code)
            .await
            .map_err(|e| anyhow!("Failed to create unique code index: {}", e))?;
        Ok(())
    }

    async fn collect(&self, filter: Document, sort: Document) -> StoreResult<Vec<Product>> {
        let cursor = self
            .collection()
            .find(filter)
            .sort(sort)
            .await
            .map_err(|e| backend("Failed to query products", e))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| backend("Failed to read products", e))?;
        docs.into_iter()
            .map(|d| from_document(d).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn query(
        &self,
        filter: &CatalogFilter,
        request: &PageRequest,
    ) -> StoreResult<Page<Product>> {
        let query = filter_document(filter);

        let total = self
            .collection()
            .count_documents(query.clone())
            .await
            .map_err(|e| backend("Failed to count products", e))?;

        let cursor = self
            .collection()
            .find(query)
            .sort(sort_document(request))
            .skip(request.offset() as u64)
            .limit(request.limit as i64)
            .await
            .map_err(|e| backend("Failed to query products", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| backend("Failed to read products", e))?;

        let items = docs
            .into_iter()
            .map(from_document)
            .collect::<anyhow::Result<Vec<Product>>>()?;

        Ok(Page {
            items,
            total: total as usize,
        })
    }

    async fn get(&self, id: &Uuid) -> StoreResult<Option<Product>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| backend("Failed to get product", e))?;

        Ok(doc.map(from_document).transpose()?)
    }

    async fn get_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        let wanted: Vec<Bson> = ids.iter().map(uuid_bson).collect();
        self.collect(doc! { "_id": { "$in": wanted } }, doc! { "created_seq": 1 })
            .await
    }

    async fn insert(&self, product: Product) -> StoreResult<Product> {
        let doc = product_document(&product)?;

        match self.collection().insert_one(doc).await {
            Ok(_) => Ok(product),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Conflict {
                field: "code",
                value: product.code,
            }),
            Err(e) => Err(backend("Failed to insert product", e)),
        }
    }

    async fn update(&self, id: &Uuid, patch: ProductPatch) -> StoreResult<Option<Product>> {
        let code = patch.code.clone();
        let result = self
            .collection()
            .find_one_and_update(
                doc! { "_id": uuid_bson(id) },
                doc! { "$set": set_document(patch) },
            )
            .return_document(ReturnDocument::After)
            .await;

        match result {
            Ok(doc) => Ok(doc.map(from_document).transpose()?),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Conflict {
                field: "code",
                value: code.unwrap_or_default(),
            }),
            Err(e) => Err(backend("Failed to update product", e)),
        }
    }

    async fn delete(&self, id: &Uuid) -> StoreResult<bool> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| backend("Failed to delete product", e))?;

        Ok(result.deleted_count > 0)
    }

    async fn all(&self) -> StoreResult<Vec<Product>> {
        self.collect(doc! {}, doc! { "created_seq": 1 }).await
    }
}

// ---------------------------------------------------------------------------
// MongoCartStore
// ---------------------------------------------------------------------------

/// Cart store backed by MongoDB
#[derive(Clone, Debug)]
pub struct MongoCartStore {
    database: Database,
}

impl MongoCartStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> Collection<Document> {
        self.database.collection(CARTS)
    }
}

#[async_trait]
impl CartStore for MongoCartStore {
    async fn insert(&self, cart: Cart) -> StoreResult<Cart> {
        let doc = to_document(&cart)?;
        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| backend("Failed to insert cart", e))?;
        Ok(cart)
    }

    async fn get(&self, id: &Uuid) -> StoreResult<Option<Cart>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| backend("Failed to get cart", e))?;

        Ok(doc.map(from_document).transpose()?)
    }

    async fn put(&self, cart: Cart) -> StoreResult<Option<Cart>> {
        let doc = to_document(&cart)?;
        let result = self
            .collection()
            .replace_one(doc! { "_id": uuid_bson(&cart.id) }, doc)
            .await
            .map_err(|e| backend("Failed to replace cart", e))?;

        Ok((result.matched_count > 0).then_some(cart))
    }
}
