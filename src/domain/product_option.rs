use std::fmt;

use serde::{Deserialize, Serialize};

/// Domain representation of a priced variant owned by a single product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductOption {
    /// Unique identifier of the option.
    pub id: i32,
    /// Identifier of the owning product.
    pub product_id: i32,
    /// Human-readable name of the option.
    pub name: String,
    /// Price of the option. Zero and negative values are allowed.
    pub price: i64,
}

impl fmt::Display for ProductOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Payload required to insert an option for a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductOption {
    /// Human-readable name of the option.
    pub name: String,
    /// Price of the option.
    pub price: i64,
}

impl NewProductOption {
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}
