//! Product records and their write payloads
//!
//! [`ProductDraft`] and [`ProductPatch`] are the shapes accepted over HTTP.
//! Both are normalized (strings trimmed) and then validated with the
//! `validator` derive before anything reaches a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::ValidationError;

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Business key, unique across the catalog
    pub code: String,
    pub price: f64,
    pub stock: u32,
    pub category: String,
    /// Active / sellable
    pub status: bool,
    #[serde(default)]
    pub thumbnails: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// Apply a validated patch in place, touching `updated_at`
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(code) = patch.code {
            self.code = code;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock as u32;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(thumbnails) = patch.thumbnails {
            self.thumbnails = thumbnails;
        }
        self.updated_at = Utc::now();
    }
}

/// Payload for `POST /api/products`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductDraft {
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    pub title: Option<String>,

    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    pub description: Option<String>,

    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    pub code: Option<String>,

    #[validate(
        required(message = "is required"),
        range(min = 0.0, message = "must be greater than or equal to 0")
    )]
    pub price: Option<f64>,

    #[validate(range(min = 0, max = 4_294_967_295_i64, message = "must be between 0 and 4294967295"))]
    pub stock: Option<i64>,

    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    pub category: Option<String>,

    pub status: Option<bool>,

    pub thumbnails: Option<Vec<String>>,
}

impl ProductDraft {
    /// Trim, validate and fill defaults (stock 0, status true, no thumbnails)
    pub fn into_product(self) -> Result<Product, ValidationError> {
        let draft = self.trimmed();
        draft.validate()?;

        let now = Utc::now();
        Ok(Product {
            id: Uuid::new_v4(),
            title: draft.title.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            code: draft.code.unwrap_or_default(),
            price: draft.price.unwrap_or_default(),
            stock: draft.stock.unwrap_or(0) as u32,
            category: draft.category.unwrap_or_default(),
            status: draft.status.unwrap_or(true),
            thumbnails: draft.thumbnails.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    fn trimmed(self) -> Self {
        Self {
            title: trim(self.title),
            description: trim(self.description),
            code: trim(self.code),
            category: trim(self.category),
            ..self
        }
    }
}

/// Payload for `PUT /api/products/{pid}`; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub code: Option<String>,

    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub price: Option<f64>,

    #[validate(range(min = 0, max = 4_294_967_295_i64, message = "must be between 0 and 4294967295"))]
    pub stock: Option<i64>,

    pub category: Option<String>,

    pub status: Option<bool>,

    pub thumbnails: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let patch = Self {
            title: trim(self.title),
            description: trim(self.description),
            code: trim(self.code),
            category: trim(self.category),
            ..self
        };
        patch.validate()?;
        Ok(patch)
    }
}

fn trim(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string())
}
