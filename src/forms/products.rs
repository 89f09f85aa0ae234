use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

use crate::domain::product::{NewProduct, UpdateProduct};
use crate::domain::product_option::NewProductOption;
use crate::domain::tag::{MalformedTag, TagRef};

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing a product payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductFormError {
    /// The product name is absent, null, or empty.
    #[error("product name is required")]
    NameRequired,
    /// A nested entry lacks a mandatory key.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// A value has the wrong shape or cannot be coerced.
    #[error("invalid data format: {0}")]
    InvalidFormat(String),
}

/// JSON body accepted by the create and update endpoints.
///
/// Fields stay loosely typed so that every entry can be checked in request
/// order and reported individually. A key that is present with `null` is
/// distinguished from an absent key.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub option_set: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub tag_set: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Name submitted when creating a product.
#[derive(Debug, Validate)]
struct ProductNameForm {
    #[validate(length(min = 1))]
    name: String,
}

impl ProductPayload {
    /// Reads a raw request body. A blank body is an empty payload.
    pub fn from_body(body: &[u8]) -> ProductFormResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|err| ProductFormError::InvalidFormat(err.to_string()))
    }

    /// Validates the payload into a domain `NewProduct`.
    ///
    /// The name is checked before anything else, then every option in order.
    /// Tags are read in order up to the first malformed entry.
    pub fn into_new_product(self) -> ProductFormResult<NewProduct> {
        let name = match self.name {
            None | Some(Value::Null) => return Err(ProductFormError::NameRequired),
            Some(Value::String(name)) => name,
            Some(other) => return Err(unexpected_type("name", "a string", &other)),
        };

        let form = ProductNameForm { name };
        form.validate().map_err(|_| ProductFormError::NameRequired)?;

        let options = match self.option_set {
            Some(value) => parse_options(value)?,
            None => Vec::new(),
        };

        let tags = match self.tag_set {
            Some(value) => parse_tags(value)?,
            None => Vec::new(),
        };

        Ok(NewProduct::new(form.name).with_options(options).with_tags(tags))
    }

    /// Validates the payload into a domain `UpdateProduct`.
    ///
    /// Only the keys present in the request become part of the patch.
    pub fn into_update_product(self) -> ProductFormResult<UpdateProduct> {
        let mut update = UpdateProduct::new();

        if let Some(value) = self.name {
            match value {
                Value::String(name) => update = update.name(name),
                other => return Err(unexpected_type("name", "a string", &other)),
            }
        }

        if let Some(value) = self.option_set {
            update = update.options(parse_options(value)?);
        }

        if let Some(value) = self.tag_set {
            update = update.tags(parse_tags(value)?);
        }

        Ok(update)
    }
}

fn parse_options(value: Value) -> ProductFormResult<Vec<NewProductOption>> {
    expect_list("option_set", value)?
        .iter()
        .map(parse_option)
        .collect()
}

fn parse_option(entry: &Value) -> ProductFormResult<NewProductOption> {
    let entry = expect_object("option_set", entry)?;

    let name = match entry.get("name") {
        None => return Err(ProductFormError::MissingField("name")),
        Some(Value::String(name)) => name.clone(),
        Some(other) => return Err(unexpected_type("name", "a string", other)),
    };

    let price = match entry.get("price") {
        None => return Err(ProductFormError::MissingField("price")),
        Some(value) => coerce_integer("price", value).map_err(ProductFormError::InvalidFormat)?,
    };

    Ok(NewProductOption::new(name, price))
}

/// Reads tag entries in request order, stopping at the first malformed one.
///
/// The malformed entry is kept as `TagRef::Malformed` rather than returned as
/// an error: an earlier entry naming a missing tag must still win, and that
/// is only known once the entries are resolved against the store.
fn parse_tags(value: Value) -> ProductFormResult<Vec<TagRef>> {
    let entries = expect_list("tag_set", value)?;

    let mut tags = Vec::with_capacity(entries.len());
    for entry in &entries {
        match parse_tag(entry) {
            Ok(tag) => tags.push(tag),
            Err(reason) => {
                tags.push(TagRef::Malformed(reason));
                break;
            }
        }
    }

    Ok(tags)
}

fn parse_tag(entry: &Value) -> Result<TagRef, MalformedTag> {
    let Some(entry) = entry.as_object() else {
        let detail = type_mismatch("tag_set", "a list of objects", entry);
        return Err(MalformedTag::InvalidFormat(detail));
    };

    match entry.get("pk") {
        Some(Value::Null) | None => {}
        Some(pk) => {
            return coerce_integer("pk", pk)
                .map(TagRef::Id)
                .map_err(MalformedTag::InvalidFormat);
        }
    }

    match entry.get("name") {
        None => Err(MalformedTag::MissingName),
        Some(Value::String(name)) => Ok(TagRef::Name(name.clone())),
        Some(other) => {
            let detail = type_mismatch("name", "a string", other);
            Err(MalformedTag::InvalidFormat(detail))
        }
    }
}

fn expect_list(field: &str, value: Value) -> ProductFormResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(unexpected_type(field, "a list", &other)),
    }
}

fn expect_object<'a>(
    field: &str,
    value: &'a Value,
) -> ProductFormResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| unexpected_type(field, "a list of objects", value))
}

/// Coerce a JSON value into an integer, returning the client-facing detail
/// on failure.
///
/// Integers pass through, floats are truncated toward zero, booleans count as
/// 1 and 0, and strings are parsed after trimming.
fn coerce_integer(field: &str, value: &Value) -> Result<i64, String> {
    let coerced = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite() && float.abs() < i64::MAX as f64)
                .map(|float| float.trunc() as i64)
        }),
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    coerced.ok_or_else(|| type_mismatch(field, "a number", value))
}

fn type_mismatch(field: &str, expected: &str, value: &Value) -> String {
    format!("Field '{field}' expected {expected} but got {value}.")
}

fn unexpected_type(field: &str, expected: &str, value: &Value) -> ProductFormError {
    ProductFormError::InvalidFormat(type_mismatch(field, expected, value))
}
