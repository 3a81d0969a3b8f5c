//! Core module containing the domain types and store traits

pub mod cart;
pub mod error;
pub mod events;
pub mod extractors;
pub mod filter;
pub mod page_links;
pub mod product;
pub mod query;
pub mod store;
pub mod summary;

pub use cart::{Cart, LineItem};
pub use error::{ErrorKind, ShopError, StoreError, StoreResult, ValidationError};
pub use events::{CatalogEvent, EventBus, EventEnvelope};
pub use extractors::{JsonBody, Success, parse_id};
pub use filter::{CatalogFilter, QueryClass, StockFilter, classify_query};
pub use page_links::{PageLinks, build_page_links, page_link};
pub use product::{Product, ProductDraft, ProductPatch};
pub use query::{
    Page, PageDefaults, PageOptions, PageRequest, PaginationMeta, RawParams, SortField,
    SortOrder, StoreSort,
};
pub use store::{CartStore, ProductStore};
pub use summary::{CartSummary, ResolvedLine, resolve_lines, summarize};
