//! Query parameters and pagination utilities

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::product::Product;

/// Raw query-string parameters in the order the caller supplied them
///
/// Values are kept verbatim so pagination links can reproduce the caller's
/// request. A repeated key keeps its first position and its last value.
///
/// # Example
/// ```rust,ignore
/// pub async fn list_products(Query(params): Query<RawParams>) -> ... {
///     let filter = CatalogFilter::from_params(&params);
/// }
///
/// // GET /api/products?limit=5&sort=asc&category=shoes&page=2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams(IndexMap<String, String>);

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a urlencoded query string; malformed input yields no parameters
    pub fn parse(query: &str) -> Self {
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .map(Self::from_iter)
            .unwrap_or_default()
    }

    /// Non-empty value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Every pair except `key`, in insertion order
    pub fn without<'a>(&'a self, key: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k.as_str() != key)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<'de> Deserialize<'de> for RawParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<(String, String)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// User-facing sort order; both map onto price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `asc` / `desc`; anything else means store-default order
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn by_price(self) -> StoreSort {
        StoreSort {
            field: SortField::Price,
            descending: self == SortOrder::Desc,
        }
    }
}

/// Fields a store must be able to sort on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Stock,
    CreatedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::Stock => "stock",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSort {
    pub field: SortField,
    pub descending: bool,
}

impl StoreSort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Stable in-place sort of products. Ties keep store-default (insertion)
    /// order, except newest-first where equal timestamps come out in reverse
    /// insertion order.
    pub fn sort(&self, products: &mut [Product]) {
        let newest_first = self.descending && self.field == SortField::CreatedAt;
        if newest_first {
            products.reverse();
        }
        products.sort_by(|a, b| {
            let ordering = match self.field {
                SortField::Price => a.price.total_cmp(&b.price),
                SortField::Stock => a.stock.cmp(&b.stock),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}

/// A fully-resolved page request handed to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based
    pub page: usize,
    pub limit: usize,
    /// `None` = store-default (insertion) order
    pub sort: Option<StoreSort>,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            sort: None,
        }
    }

    pub fn sorted(mut self, sort: StoreSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Number of items to skip
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of items plus the total number of matches
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    /// Slice a fully-materialized, already-ordered result set
    pub fn from_all(all: Vec<T>, request: &PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.limit)
            .collect();
        Self { items, total }
    }
}

/// Default and maximum page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub limit: usize,
    pub max_limit: usize,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            limit: 10,
            max_limit: 100,
        }
    }
}

/// Pagination options coerced from request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub page: usize,
    pub limit: usize,
    pub sort: Option<SortOrder>,
}

impl PageOptions {
    /// Coerce `page`, `limit` and `sort`. Non-numeric, missing or zero values
    /// fall back to the defaults; `limit` is capped at `max_limit`.
    pub fn from_params(params: &RawParams, defaults: PageDefaults) -> Self {
        let page = parse_positive(params.get("page")).unwrap_or(1);
        let limit = parse_positive(params.get("limit"))
            .unwrap_or(defaults.limit)
            .min(defaults.max_limit.max(1));
        let sort = params.get("sort").and_then(SortOrder::parse);

        Self { page, limit, sort }
    }

    pub fn to_request(&self) -> PageRequest {
        let request = PageRequest::new(self.page, self.limit);
        match self.sort {
            Some(order) => request.sorted(order.by_price()),
            None => request,
        }
    }
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PageDefaults::default().limit,
            sort: None,
        }
    }
}

fn parse_positive(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages, never below 1
    pub total_pages: usize,

    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit).max(1);
        let has_prev_page = page > 1;
        let has_next_page = page < total_pages;

        Self {
            page,
            limit,
            total,
            total_pages,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page - 1),
            next_page: has_next_page.then(|| page + 1),
        }
    }
}
