use diesel::prelude::*;

use crate::domain::product_option::{
    NewProductOption as DomainNewProductOption, ProductOption as DomainProductOption,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_options)]
#[diesel(belongs_to(super::product::Product, foreign_key = product_id))]
pub struct ProductOption {
    pub id: i32,
    pub product_id: i32,
    pub name: String,
    pub price: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_options)]
pub struct NewProductOption<'a> {
    pub product_id: i32,
    pub name: &'a str,
    pub price: i64,
}

impl<'a> NewProductOption<'a> {
    pub fn from_domain(product_id: i32, value: &'a DomainNewProductOption) -> Self {
        Self {
            product_id,
            name: value.name.as_str(),
            price: value.price,
        }
    }
}

impl From<ProductOption> for DomainProductOption {
    fn from(value: ProductOption) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            name: value.name,
            price: value.price,
        }
    }
}
