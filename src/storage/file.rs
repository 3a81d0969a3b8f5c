//! Flat JSON-file stores
//!
//! Each collection lives in one JSON array file (`products.json`,
//! `carts.json`). Every mutation is a whole-file read-modify-write, so writes
//! to one file are serialized behind an async mutex, and the new content is
//! written to a sibling temp file and renamed into place so readers never see
//! a torn file.
//!
//! A missing file reads as an empty collection.

use crate::core::error::StoreResult;
use crate::core::{
    Cart, CartStore, CatalogFilter, Page, PageRequest, Product, ProductPatch, ProductStore,
};
use crate::storage::in_memory::{check_code_unique, run_query};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const PRODUCTS_FILE: &str = "products.json";
pub const CARTS_FILE: &str = "carts.json";

/// One JSON array file holding every record of a collection
struct JsonFile<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> JsonFile<T> {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    async fn load(&self) -> anyhow::Result<Vec<T>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt store file {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(anyhow!("failed to read {}: {}", self.path.display(), e)),
        }
    }

    async fn save(&self, records: &[T]) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    /// Load, let `f` mutate, save. Nothing is written when `f` fails.
    async fn modify<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let result = f(&mut records)?;
        self.save(&records).await?;
        Ok(result)
    }
}

async fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create store directory {}", dir.display()))
}

/// Product store backed by `<dir>/products.json`
pub struct FileProductStore {
    file: JsonFile<Product>,
}

impl FileProductStore {
    /// Open (creating the directory if needed) the product file in `dir`
    pub async fn open(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        ensure_dir(dir).await?;
        Ok(Self {
            file: JsonFile::new(dir.join(PRODUCTS_FILE)),
        })
    }
}

#[async_trait]
impl ProductStore for FileProductStore {
    async fn query(
        &self,
        filter: &CatalogFilter,
        request: &PageRequest,
    ) -> StoreResult<Page<Product>> {
        let products = self.file.load().await?;
        Ok(run_query(products.into_iter(), filter, request))
    }

    async fn get(&self, id: &Uuid) -> StoreResult<Option<Product>> {
        let products = self.file.load().await?;
        Ok(products.into_iter().find(|p| &p.id == id))
    }

    async fn get_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        let products = self.file.load().await?;
        Ok(ids
            .iter()
            .filter_map(|id| products.iter().find(|p| &p.id == id).cloned())
            .collect())
    }

    async fn insert(&self, product: Product) -> StoreResult<Product> {
        self.file
            .modify(|products| {
                check_code_unique(products.iter(), &product.code, None)?;
                products.push(product.clone());
                Ok(product)
            })
            .await
    }

    async fn update(&self, id: &Uuid, patch: ProductPatch) -> StoreResult<Option<Product>> {
        self.file
            .modify(|products| {
                let Some(index) = products.iter().position(|p| &p.id == id) else {
                    return Ok(None);
                };
                if let Some(code) = &patch.code {
                    check_code_unique(products.iter(), code, Some(id))?;
                }
                let product = &mut products[index];
                product.apply(patch);
                Ok(Some(product.clone()))
            })
            .await
    }

    async fn delete(&self, id: &Uuid) -> StoreResult<bool> {
        self.file
            .modify(|products| {
                let before = products.len();
                products.retain(|p| &p.id != id);
                Ok(products.len() < before)
            })
            .await
    }

    async fn all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.file.load().await?)
    }
}

/// Cart store backed by `<dir>/carts.json`
pub struct FileCartStore {
    file: JsonFile<Cart>,
}

impl FileCartStore {
    /// Open (creating the directory if needed) the cart file in `dir`
    pub async fn open(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        ensure_dir(dir).await?;
        Ok(Self {
            file: JsonFile::new(dir.join(CARTS_FILE)),
        })
    }
}

#[async_trait]
impl CartStore for FileCartStore {
    async fn insert(&self, cart: Cart) -> StoreResult<Cart> {
        self.file
            .modify(|carts| {
                carts.push(cart.clone());
                Ok(cart)
            })
            .await
    }

    async fn get(&self, id: &Uuid) -> StoreResult<Option<Cart>> {
        let carts = self.file.load().await?;
        Ok(carts.into_iter().find(|c| &c.id == id))
    }

    async fn put(&self, cart: Cart) -> StoreResult<Option<Cart>> {
        self.file
            .modify(|carts| match carts.iter_mut().find(|c| c.id == cart.id) {
                Some(slot) => {
                    *slot = cart.clone();
                    Ok(Some(cart))
                }
                None => Ok(None),
            })
            .await
    }
}
