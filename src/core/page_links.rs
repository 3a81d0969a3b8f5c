//! Previous/next page link construction
//!
//! Links reproduce every parameter the caller sent except `page`, verbatim and
//! in the caller's order, then append the target page:
//!
//! ```text
//! /api/products?limit=5&sort=asc&category=shoes&page=3
//! ```

use serde::Serialize;

use crate::core::query::{PaginationMeta, RawParams};

/// Navigable links around the current page; `None` serializes as `null`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

/// Build the link pair for `meta`, based at `base`
pub fn build_page_links(base: &str, params: &RawParams, meta: &PaginationMeta) -> PageLinks {
    let preserved = preserved_query(params);
    PageLinks {
        prev_link: meta.prev_page.map(|page| page_url(base, &preserved, page)),
        next_link: meta.next_page.map(|page| page_url(base, &preserved, page)),
    }
}

/// Link to an arbitrary page with the same preserved parameters
pub fn page_link(base: &str, params: &RawParams, page: usize) -> String {
    page_url(base, &preserved_query(params), page)
}

fn preserved_query(params: &RawParams) -> String {
    let pairs: Vec<(&str, &str)> = params.without("page").collect();
    // Serializing string pairs cannot fail
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}

fn page_url(base: &str, preserved: &str, page: usize) -> String {
    if preserved.is_empty() {
        format!("{}?page={}", base, page)
    } else {
        format!("{}?{}&page={}", base, preserved, page)
    }
}
