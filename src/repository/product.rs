use std::collections::HashMap;

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;
use diesel::sqlite::SqliteConnection;

use crate::{
    domain::product::{
        NewProduct as DomainNewProduct, Product as DomainProduct,
        UpdateProduct as DomainUpdateProduct,
    },
    domain::product_option::{
        NewProductOption as DomainNewProductOption, ProductOption as DomainProductOption,
    },
    domain::tag::{Tag as DomainTag, TagRef},
    models::product::{
        NewProduct as DbNewProduct, Product as DbProduct, UpdateProduct as DbUpdateProduct,
    },
    models::product_option::{
        NewProductOption as DbNewProductOption, ProductOption as DbProductOption,
    },
    models::product_tag::NewProductTag as DbNewProductTag,
    models::tag::{NewTag as DbNewTag, Tag as DbTag},
    repository::{
        DieselRepository, ProductReader, ProductWriter, RepositoryError, RepositoryResult,
    },
};

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let product = products::table
            .filter(products::id.eq(id))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        match product {
            Some(db_product) => Ok(Some(load_product(&mut conn, db_product)?)),
            None => Ok(None),
        }
    }

    fn product_exists(&self, id: i32) -> RepositoryResult<bool> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let found = select(exists(products::table.filter(products::id.eq(id))))
            .get_result::<bool>(&mut conn)?;

        Ok(found)
    }

    fn list_products(&self) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_products = products::table
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?;

        if db_products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<i32> = db_products.iter().map(|product| product.id).collect();
        let mut option_map = load_options_for_products(&mut conn, &product_ids)?;
        let mut tag_map = load_tags_for_products(&mut conn, &product_ids)?;

        let products = db_products
            .into_iter()
            .map(|db_product| {
                let options = option_map.remove(&db_product.id).unwrap_or_default();
                let tags = tag_map.remove(&db_product.id).unwrap_or_default();
                db_product.into_domain(options, tags)
            })
            .collect();

        Ok(products)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let db_new = DbNewProduct::from(new_product);

            let created = diesel::insert_into(products::table)
                .values(&db_new)
                .get_result::<DbProduct>(conn)?;

            insert_options(conn, created.id, &new_product.options)?;
            attach_tags(conn, created.id, &new_product.tags)?;

            load_product(conn, created)
        })
    }

    fn update_product(
        &self,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::{product_options, product_tags, products};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let db_updates = DbUpdateProduct::from(updates);

            let updated = diesel::update(products::table.filter(products::id.eq(product_id)))
                .set(&db_updates)
                .get_result::<DbProduct>(conn)?;

            if let Some(options) = updates.options.as_ref() {
                diesel::delete(
                    product_options::table.filter(product_options::product_id.eq(product_id)),
                )
                .execute(conn)?;
                insert_options(conn, product_id, options)?;
            }

            if let Some(tags) = updates.tags.as_ref() {
                diesel::delete(product_tags::table.filter(product_tags::product_id.eq(product_id)))
                    .execute(conn)?;
                attach_tags(conn, product_id, tags)?;
            }

            load_product(conn, updated)
        })
    }

    fn delete_product(&self, product_id: i32) -> RepositoryResult<()> {
        use crate::schema::{product_options, product_tags, products};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<(), RepositoryError, _>(|conn| {
            diesel::delete(
                product_options::table.filter(product_options::product_id.eq(product_id)),
            )
            .execute(conn)?;
            diesel::delete(product_tags::table.filter(product_tags::product_id.eq(product_id)))
                .execute(conn)?;

            let deleted =
                diesel::delete(products::table.filter(products::id.eq(product_id))).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
    }
}

fn insert_options(
    conn: &mut SqliteConnection,
    product_id: i32,
    options: &[DomainNewProductOption],
) -> RepositoryResult<()> {
    use crate::schema::product_options;

    if options.is_empty() {
        return Ok(());
    }

    let payload: Vec<DbNewProductOption> = options
        .iter()
        .map(|option| DbNewProductOption::from_domain(product_id, option))
        .collect();

    diesel::insert_into(product_options::table)
        .values(&payload)
        .execute(conn)?;

    Ok(())
}

/// Link every referenced tag to the product, in request order.
///
/// Tags addressed by key must already exist. Tags addressed by name are
/// created on first use; the unique index on `tags.name` turns a concurrent
/// creation into a no-op followed by a lookup of the winning row. The first
/// failing entry aborts the enclosing transaction.
fn attach_tags(
    conn: &mut SqliteConnection,
    product_id: i32,
    tags: &[TagRef],
) -> RepositoryResult<()> {
    use crate::schema::product_tags;

    for tag in tags {
        let tag_id = match tag {
            TagRef::Id(id) => find_tag_id(conn, *id)?,
            TagRef::Name(name) => get_or_create_tag_id(conn, name)?,
            TagRef::Malformed(reason) => {
                return Err(RepositoryError::MalformedTag(reason.clone()));
            }
        };

        diesel::insert_or_ignore_into(product_tags::table)
            .values(&DbNewProductTag::new(product_id, tag_id))
            .execute(conn)?;
    }

    Ok(())
}

fn find_tag_id(conn: &mut SqliteConnection, id: i64) -> RepositoryResult<i32> {
    use crate::schema::tags;

    let Ok(key) = i32::try_from(id) else {
        return Err(RepositoryError::TagNotFound(id));
    };

    tags::table
        .filter(tags::id.eq(key))
        .select(tags::id)
        .first::<i32>(conn)
        .optional()?
        .ok_or(RepositoryError::TagNotFound(id))
}

fn get_or_create_tag_id(conn: &mut SqliteConnection, name: &str) -> RepositoryResult<i32> {
    use crate::schema::tags;

    diesel::insert_or_ignore_into(tags::table)
        .values(&DbNewTag { name })
        .execute(conn)?;

    let id = tags::table
        .filter(tags::name.eq(name))
        .select(tags::id)
        .first::<i32>(conn)?;

    Ok(id)
}

fn load_product(
    conn: &mut SqliteConnection,
    db_product: DbProduct,
) -> RepositoryResult<DomainProduct> {
    let product_ids = [db_product.id];
    let options = load_options_for_products(conn, &product_ids)?
        .remove(&db_product.id)
        .unwrap_or_default();
    let tags = load_tags_for_products(conn, &product_ids)?
        .remove(&db_product.id)
        .unwrap_or_default();

    Ok(db_product.into_domain(options, tags))
}

fn load_options_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DomainProductOption>>> {
    use crate::schema::product_options;

    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = product_options::table
        .filter(product_options::product_id.eq_any(product_ids))
        .order(product_options::id.asc())
        .load::<DbProductOption>(conn)?;

    let mut map: HashMap<i32, Vec<DomainProductOption>> = HashMap::new();
    for row in rows {
        map.entry(row.product_id).or_default().push(row.into());
    }

    Ok(map)
}

fn load_tags_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DomainTag>>> {
    use crate::schema::{product_tags, tags};

    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = product_tags::table
        .inner_join(tags::table)
        .filter(product_tags::product_id.eq_any(product_ids))
        .order(product_tags::id.asc())
        .select((product_tags::product_id, DbTag::as_select()))
        .load::<(i32, DbTag)>(conn)?;

    let mut map: HashMap<i32, Vec<DomainTag>> = HashMap::new();
    for (product_id, tag) in rows {
        map.entry(product_id).or_default().push(tag.into());
    }

    Ok(map)
}
