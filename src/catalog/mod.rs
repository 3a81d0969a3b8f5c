//! Product catalog: listing, pagination links and product CRUD

pub mod handlers;
pub mod service;

pub use handlers::{CatalogState, product_routes};
pub use service::{CatalogQueryOutcome, CatalogService, PageResult};
