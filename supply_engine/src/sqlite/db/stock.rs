use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{db_types::ProductInfo, feed::FeedGood};

/// Deletes every stock record owned by the shop. Parameter rows cascade. Strictly scoped to `shop_id`; shared
/// products/categories/parameters are left alone. Returns the number of records removed.
pub async fn clear_shop_stock(shop_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM product_infos WHERE shop_id = ?")
        .bind(shop_id)
        .execute(conn)
        .await?;
    debug!("🗃️ Cleared {} stock records for shop {shop_id}", res.rows_affected());
    Ok(res.rows_affected())
}

/// Inserts a fresh stock record for a good from a feed and returns its id.
pub async fn insert_product_info(
    shop_id: i64,
    good: &FeedGood,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO product_infos (product_id, shop_id, model, quantity, price, price_rrc)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(good.id)
    .bind(shop_id)
    .bind(&good.model)
    .bind(i64::from(good.quantity))
    .bind(i64::from(good.price))
    .bind(i64::from(good.price_rrc))
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn fetch_product_info(
    product_info_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ProductInfo>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM product_infos WHERE id = ?")
        .bind(product_info_id)
        .fetch_optional(conn)
        .await
}

/// Debits stock with a guarded compare-and-swap. The `quantity >= ?` guard makes the check-then-debit a single
/// statement, so two orders racing for the last units cannot both win. Returns false when stock is insufficient.
pub async fn debit_stock(
    product_info_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("UPDATE product_infos SET quantity = quantity - ? WHERE id = ? AND quantity >= ?")
        .bind(quantity)
        .bind(product_info_id)
        .bind(quantity)
        .execute(conn)
        .await?;
    let debited = res.rows_affected() > 0;
    trace!("🗃️ Debit of {quantity} from stock record {product_info_id}: {}", if debited { "ok" } else { "refused" });
    Ok(debited)
}

/// Credits stock back on cancellation.
pub async fn credit_stock(
    product_info_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    let _ = sqlx::query("UPDATE product_infos SET quantity = quantity + ? WHERE id = ?")
        .bind(quantity)
        .bind(product_info_id)
        .execute(conn)
        .await?;
    trace!("🗃️ Credited {quantity} back to stock record {product_info_id}");
    Ok(())
}

pub async fn available_quantity(product_info_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT quantity FROM product_infos WHERE id = ?")
        .bind(product_info_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(|(q,)| q).unwrap_or_default())
}
