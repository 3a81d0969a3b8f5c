//! Storage implementations for different backends

pub mod file;
pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use file::{FileCartStore, FileProductStore};
pub use in_memory::{InMemoryCartStore, InMemoryProductStore};
#[cfg(feature = "mongodb_backend")]
pub use mongodb::{MongoCartStore, MongoProductStore};
