//! Catalog filter builder
//!
//! Turns raw query parameters into a [`CatalogFilter`]. Two call styles are
//! accepted and may be mixed:
//!
//! - separate `category`, `status` and `stock` parameters, ANDed together
//! - a single overloaded `query` parameter, classified by [`classify_query`]
//!
//! When both name the same field the explicit parameter wins.

use serde::Serialize;

use crate::core::product::Product;
use crate::core::query::RawParams;

/// Stock availability filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    /// stock > 0
    Available,
    /// stock == 0
    Unavailable,
}

impl StockFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(StockFilter::Available),
            "unavailable" => Some(StockFilter::Unavailable),
            _ => None,
        }
    }

    pub fn matches(&self, stock: u32) -> bool {
        match self {
            StockFilter::Available => stock > 0,
            StockFilter::Unavailable => stock == 0,
        }
    }
}

/// How a single `query` value is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryClass {
    Status(bool),
    Stock(StockFilter),
    Category(String),
}

/// Classify an overloaded `query` value. First matching rule wins; anything
/// unrecognized becomes a category substring.
pub fn classify_query(value: &str) -> QueryClass {
    match value {
        "true" => QueryClass::Status(true),
        "false" => QueryClass::Status(false),
        other => match StockFilter::parse(other) {
            Some(stock) => QueryClass::Stock(stock),
            None => QueryClass::Category(other.to_string()),
        },
    }
}

/// Normalized catalog filter. Empty means "match everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogFilter {
    /// Case-insensitive literal substring of the product category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<StockFilter>,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from request parameters
    pub fn from_params(params: &RawParams) -> Self {
        let mut filter = match params.get("query") {
            Some(query) => Self::from_query(query),
            None => Self::default(),
        };

        if let Some(category) = params.get("category") {
            filter.category = Some(category.to_string());
        }
        if let Some(status) = params.get("status") {
            filter.status = Some(status == "true");
        }
        if let Some(stock) = params.get("stock").and_then(StockFilter::parse) {
            filter.stock = Some(stock);
        }

        filter
    }

    /// Build a filter from a single overloaded `query` value
    pub fn from_query(value: &str) -> Self {
        match classify_query(value) {
            QueryClass::Status(status) => Self::new().with_status(status),
            QueryClass::Stock(stock) => Self::new().with_stock(stock),
            QueryClass::Category(category) => Self::new().with_category(category),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_status(mut self, status: bool) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_stock(mut self, stock: StockFilter) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.status.is_none() && self.stock.is_none()
    }

    /// Evaluate the filter against a product (used by non-database stores)
    pub fn matches(&self, product: &Product) -> bool {
        self.category.as_deref().is_none_or(|needle| {
            product
                .category
                .to_lowercase()
                .contains(&needle.to_lowercase())
        }) && self.status.is_none_or(|status| product.status == status)
            && self.stock.is_none_or(|stock| stock.matches(product.stock))
    }
}
