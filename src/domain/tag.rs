use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Domain representation of a reusable tag that can be attached to multiple products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Unique identifier of the tag.
    pub id: i32,
    /// Unique human-readable name of the tag.
    pub name: String,
    /// Timestamp for when the tag record was created.
    pub created_at: NaiveDateTime,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Payload required to insert a new tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    /// Human-readable name of the tag.
    pub name: String,
}

impl NewTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to a tag supplied when writing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRef {
    /// An existing tag addressed by its key. The key is kept wide so that
    /// out-of-range values surface as "not found" rather than a format error.
    Id(i64),
    /// A tag addressed by name, created on first use.
    Name(String),
    /// An entry that could not be read. Tags are linked in request order, so
    /// this is reported only once every earlier entry has been resolved.
    Malformed(MalformedTag),
}

/// Why a tag entry in a write request could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedTag {
    /// Neither a key nor a name was given.
    MissingName,
    /// A value had the wrong shape; carries the detail for the client.
    InvalidFormat(String),
}
