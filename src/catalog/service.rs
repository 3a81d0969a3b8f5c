//! Catalog query and mutation service
//!
//! One `CatalogService` per process. It owns the mapping from raw request
//! parameters to a store query (filter, sort, default pagination) and the
//! reconstruction of page links, and it publishes catalog events after every
//! successful mutation.

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::core::{
    CatalogEvent, CatalogFilter, EventBus, PageLinks, PageOptions, PageRequest, PaginationMeta,
    Product, ProductDraft, ProductPatch, ProductStore, RawParams, ShopError, SortField,
    StockFilter, StoreSort, build_page_links,
};

/// A page of products with metadata and navigation links
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub payload: Vec<Product>,
    #[serde(flatten)]
    pub meta: PaginationMeta,
    #[serde(flatten)]
    pub links: PageLinks,
}

/// Outcome of a catalog listing, discriminated by `status`
///
/// Store failures are reported in-band so view callers can render them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CatalogQueryOutcome {
    Success(PageResult),
    Error { message: String },
}

impl CatalogQueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CatalogQueryOutcome::Success(_))
    }

    pub fn into_result(self) -> Option<PageResult> {
        match self {
            CatalogQueryOutcome::Success(page) => Some(page),
            CatalogQueryOutcome::Error { .. } => None,
        }
    }
}

pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    event_bus: Option<Arc<EventBus>>,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>, config: CatalogConfig) -> Self {
        Self {
            store,
            event_bus: None,
            config,
        }
    }

    /// Publish catalog events to `event_bus` after each mutation
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Filtered, sorted, paginated listing with links based at `base`
    ///
    /// Never fails: a store failure becomes [`CatalogQueryOutcome::Error`].
    pub async fn query(&self, params: &RawParams, base: &str) -> CatalogQueryOutcome {
        match self.try_query(params, base).await {
            Ok(page) => CatalogQueryOutcome::Success(page),
            Err(e) => {
                tracing::error!(error = ?e, "catalog query failed");
                CatalogQueryOutcome::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    pub async fn try_query(&self, params: &RawParams, base: &str) -> Result<PageResult, ShopError> {
        let filter = CatalogFilter::from_params(params);
        let options = PageOptions::from_params(params, self.config.page_defaults());
        let request = options.to_request();

        tracing::debug!(?filter, page = request.page, limit = request.limit, "catalog query");

        let page = self.store.query(&filter, &request).await?;
        let meta = PaginationMeta::new(request.page, request.limit, page.total);
        let links = build_page_links(base, params, &meta);

        Ok(PageResult {
            payload: page.items,
            meta,
            links,
        })
    }

    pub async fn get(&self, id: &Uuid) -> Result<Product, ShopError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ShopError::product_not_found(*id))
    }

    pub async fn add(&self, draft: ProductDraft) -> Result<Product, ShopError> {
        let product = draft.into_product()?;
        let product = self.store.insert(product).await?;

        tracing::info!(product_id = %product.id, code = %product.code, "product added");
        self.publish_change(CatalogEvent::ProductAdded {
            product: product.clone(),
        })
        .await;

        Ok(product)
    }

    pub async fn update(&self, id: &Uuid, patch: ProductPatch) -> Result<Product, ShopError> {
        let patch = patch.normalized()?;
        let product = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| ShopError::product_not_found(*id))?;

        tracing::info!(product_id = %product.id, "product updated");
        self.publish_change(CatalogEvent::ProductUpdated {
            product: product.clone(),
        })
        .await;

        Ok(product)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), ShopError> {
        if !self.store.delete(id).await? {
            return Err(ShopError::product_not_found(*id));
        }

        tracing::info!(product_id = %id, "product deleted");
        self.publish_change(CatalogEvent::ProductDeleted { product_id: *id })
            .await;

        Ok(())
    }

    /// Newest products first
    pub async fn recent(&self, limit: usize) -> Result<Vec<Product>, ShopError> {
        let request = self
            .bounded(limit)
            .sorted(StoreSort::desc(SortField::CreatedAt));
        let page = self.store.query(&CatalogFilter::new(), &request).await?;
        Ok(page.items)
    }

    /// Products whose category contains `category`, cheapest first
    pub async fn by_category(&self, category: &str, limit: usize) -> Result<Vec<Product>, ShopError> {
        let filter = CatalogFilter::new().with_category(category);
        let request = self.bounded(limit).sorted(StoreSort::asc(SortField::Price));
        let page = self.store.query(&filter, &request).await?;
        Ok(page.items)
    }

    /// Products by availability, best-stocked first
    pub async fn by_availability(
        &self,
        stock: StockFilter,
        limit: usize,
    ) -> Result<Vec<Product>, ShopError> {
        let filter = CatalogFilter::new().with_stock(stock);
        let request = self.bounded(limit).sorted(StoreSort::desc(SortField::Stock));
        let page = self.store.query(&filter, &request).await?;
        Ok(page.items)
    }

    /// The whole catalog in store-default order
    pub async fn snapshot(&self) -> Result<Vec<Product>, ShopError> {
        Ok(self.store.all().await?)
    }

    fn bounded(&self, limit: usize) -> PageRequest {
        PageRequest::new(1, limit.clamp(1, self.config.page_defaults().max_limit))
    }

    /// Publish the mutation, then a snapshot of the catalog after it
    async fn publish_change(&self, event: CatalogEvent) {
        let Some(bus) = &self.event_bus else {
            return;
        };

        let receivers = bus.publish(event);
        if receivers == 0 {
            return;
        }

        match self.store.all().await {
            Ok(products) => {
                bus.publish(CatalogEvent::CatalogSnapshot { products });
            }
            Err(e) => tracing::warn!(error = ?e, "failed to load catalog snapshot"),
        }
    }
}
