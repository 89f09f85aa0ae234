use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::domain::product_option::ProductOption;
use crate::domain::tag::Tag;
use crate::forms::products::ProductPayload;
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};

/// Lists every product with its options and tags.
pub fn list_products<R>(repo: &R) -> ServiceResult<Vec<ProductView>>
where
    R: ProductReader + ?Sized,
{
    let products = repo.list_products()?;
    Ok(products.into_iter().map(ProductView::from).collect())
}

/// Loads a single product.
pub fn get_product<R>(repo: &R, product_id: i32) -> ServiceResult<ProductView>
where
    R: ProductReader + ?Sized,
{
    repo.get_product_by_id(product_id)?
        .map(ProductView::from)
        .ok_or(ServiceError::ProductNotFound)
}

/// Creates a product from a raw request body, together with its options and
/// tags, in one transaction.
pub fn create_product<R>(repo: &R, body: &[u8]) -> ServiceResult<ProductView>
where
    R: ProductWriter + ?Sized,
{
    let new_product = ProductPayload::from_body(body)?.into_new_product()?;
    let created = repo.create_product(&new_product)?;

    log::info!(
        "Created product {} with {} options and {} tags",
        created.id,
        created.options.len(),
        created.tags.len()
    );

    Ok(created.into())
}

/// Applies a partial update from a raw request body to an existing product.
///
/// The product must exist before the body is read at all. Options and tags
/// present in the payload replace the stored collections wholesale; absent
/// ones are left untouched.
pub fn update_product<R>(repo: &R, product_id: i32, body: &[u8]) -> ServiceResult<ProductView>
where
    R: ProductReader + ProductWriter + ?Sized,
{
    if !repo.product_exists(product_id)? {
        return Err(ServiceError::ProductNotFound);
    }

    let updates = ProductPayload::from_body(body)?.into_update_product()?;
    let updated = repo.update_product(product_id, &updates)?;

    Ok(updated.into())
}

/// Serialized representation of a product returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductView {
    pub pk: i32,
    pub name: String,
    pub option_set: Vec<ProductOptionView>,
    pub tag_set: Vec<TagView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductOptionView {
    pub pk: i32,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagView {
    pub pk: i32,
    pub name: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            pk: product.id,
            name: product.name,
            option_set: product.options.into_iter().map(Into::into).collect(),
            tag_set: product.tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ProductOption> for ProductOptionView {
    fn from(option: ProductOption) -> Self {
        Self {
            pk: option.id,
            name: option.name,
            price: option.price,
        }
    }
}

impl From<Tag> for TagView {
    fn from(tag: Tag) -> Self {
        Self {
            pk: tag.id,
            name: tag.name,
        }
    }
}
