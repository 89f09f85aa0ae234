use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::product_option::{NewProductOption, ProductOption};
use crate::domain::tag::{Tag, TagRef};

/// Domain representation of a catalog product with its options and tags loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Priced options owned by the product, in insertion order.
    pub options: Vec<ProductOption>,
    /// Tags attached to the product, in attachment order.
    pub tags: Vec<Tag>,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Payload required to insert a new product together with its options and tags.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Human-readable name of the product.
    pub name: String,
    /// Options created alongside the product.
    pub options: Vec<NewProductOption>,
    /// Tags attached to the product, either existing ones or created by name.
    pub tags: Vec<TagRef>,
}

impl NewProduct {
    /// Build a new product payload without options or tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Attach the options to create with the product.
    pub fn with_options(mut self, options: Vec<NewProductOption>) -> Self {
        self.options = options;
        self
    }

    /// Attach the tags to link with the product.
    pub fn with_tags(mut self, tags: Vec<TagRef>) -> Self {
        self.tags = tags;
        self
    }
}

/// Patch data applied when updating an existing product.
///
/// Every field is independent: `None` leaves the stored state untouched, while
/// `Some` replaces it entirely. An empty option or tag list therefore clears
/// the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    /// Optional name update.
    pub name: Option<String>,
    /// Optional full replacement of the product options.
    pub options: Option<Vec<NewProductOption>>,
    /// Optional full replacement of the product tags.
    pub tags: Option<Vec<TagRef>>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProduct {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            name: None,
            options: None,
            tags: None,
            updated_at: now,
        }
    }

    /// Update the product name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace every option of the product.
    pub fn options(mut self, options: Vec<NewProductOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Replace every tag link of the product.
    pub fn tags(mut self, tags: Vec<TagRef>) -> Self {
        self.tags = Some(tags);
        self
    }
}
