use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Category, ParameterValue},
    traits::{CatalogEntry, CatalogQueryFilter},
};

/// Upserts a category by feed id. Last writer wins on the name; existing shop memberships are untouched.
pub async fn upsert_category(id: i64, name: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let _ = sqlx::query(
        "INSERT INTO categories (id, name) VALUES (?, ?) ON CONFLICT (id) DO UPDATE SET name = excluded.name",
    )
    .bind(id)
    .bind(name)
    .execute(conn)
    .await?;
    Ok(())
}

/// Registers shop membership for a category. Additive only: re-ingestions never prune memberships.
pub async fn link_category_to_shop(
    category_id: i64,
    shop_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    let _ = sqlx::query("INSERT OR IGNORE INTO category_shops (category_id, shop_id) VALUES (?, ?)")
        .bind(category_id)
        .bind(shop_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Upserts a product by feed id. If the id already exists (possibly from another shop's feed), the existing
/// name/category are silently retained: feed ids are the cross-shop merge key.
pub async fn upsert_product(
    id: i64,
    name: &str,
    category_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    let _ = sqlx::query("INSERT OR IGNORE INTO products (id, name, category_id) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(category_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Upserts a parameter name and returns its id.
pub async fn upsert_parameter(name: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let _ = sqlx::query("INSERT OR IGNORE INTO parameters (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await?;
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM parameters WHERE name = ?")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(id)
}

pub async fn insert_product_parameter(
    product_info_id: i64,
    parameter_id: i64,
    value: &str,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    let _ = sqlx::query(
        "INSERT INTO product_parameters (product_info_id, parameter_id, value) VALUES (?, ?, ?)",
    )
    .bind(product_info_id)
    .bind(parameter_id)
    .bind(value)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM categories ORDER BY name").fetch_all(conn).await
}

pub async fn fetch_parameters_for_info(
    product_info_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<ParameterValue>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT parameters.name AS name, product_parameters.value AS value
        FROM product_parameters JOIN parameters ON parameters.id = product_parameters.parameter_id
        WHERE product_parameters.product_info_id = ?
        ORDER BY parameters.name
        "#,
    )
    .bind(product_info_id)
    .fetch_all(conn)
    .await
}

/// Searches the merged catalog according to the criteria in the `CatalogQueryFilter`. Shops that are not
/// accepting orders are always excluded.
pub async fn search_catalog(
    filter: CatalogQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<CatalogEntry>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT
        pi.id, pi.model, pi.quantity, pi.price, pi.price_rrc,
        p.id AS product_id, p.name AS product_name,
        c.id AS category_id, c.name AS category_name,
        s.id AS shop_id, s.name AS shop_name
    FROM product_infos pi
        JOIN products p ON p.id = pi.product_id
        JOIN categories c ON c.id = p.category_id
        JOIN shops s ON s.id = pi.shop_id
    WHERE s.accepting_orders = 1
    "#,
    );
    if let Some(shop_id) = filter.shop_id {
        builder.push(" AND pi.shop_id = ");
        builder.push_bind(shop_id);
    }
    if let Some(category_id) = filter.category_id {
        builder.push(" AND p.category_id = ");
        builder.push_bind(category_id);
    }
    if let Some(product_id) = filter.product_id {
        builder.push(" AND pi.product_id = ");
        builder.push_bind(product_id);
    }
    builder.push(" ORDER BY s.name, p.name");
    trace!("🗂️ Executing catalog query: {}", builder.sql());
    let entries = builder.build_query_as::<CatalogEntry>().fetch_all(conn).await?;
    trace!("🗂️ Catalog query returned {} entries", entries.len());
    Ok(entries)
}
