use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderItem, OrderState},
    traits::OrderSummary,
};

/// Fetches the user's open basket order, creating it if absent. The partial unique index on
/// `orders(user_id) WHERE state = 'basket'` guarantees there is at most one.
pub async fn fetch_or_create_basket(user_id: i64, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    if let Some(order) = fetch_basket_order(user_id, &mut *conn).await? {
        return Ok(order);
    }
    trace!("🗃️ Creating basket order for user {user_id}");
    sqlx::query_as("INSERT INTO orders (user_id, state) VALUES (?, 'basket') RETURNING *")
        .bind(user_id)
        .fetch_one(conn)
        .await
}

pub async fn fetch_basket_order(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE user_id = ? AND state = 'basket'")
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_order_for_user(
    order_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = ? AND user_id = ?")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

/// Inserts a basket line. The UNIQUE(order_id, product_info_id) constraint surfaces duplicate additions as a
/// database error that callers map to a conflict.
pub async fn insert_order_item(
    order_id: i64,
    product_info_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO order_items (order_id, product_info_id, quantity) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(order_id)
    .bind(product_info_id)
    .bind(quantity)
    .fetch_one(conn)
    .await
}

/// Sets the quantity of one basket line, scoped to the given order. Returns true if a row was written.
pub async fn update_item_quantity(
    order_id: i64,
    order_item_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("UPDATE order_items SET quantity = ? WHERE id = ? AND order_id = ?")
        .bind(quantity)
        .bind(order_item_id)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Deletes one basket line by id, scoped to the given order. Already-deleted ids are a no-op.
pub async fn delete_order_item(
    order_id: i64,
    order_item_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM order_items WHERE id = ? AND order_id = ?")
        .bind(order_item_id)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = ? ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

pub async fn count_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_items WHERE order_id = ?")
        .bind(order_id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Attaches the delivery contact and moves the order out of `basket`. Returns the updated order.
pub async fn mark_placed(
    order_id: i64,
    contact_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET state = ?, contact_id = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(OrderState::New)
    .bind(contact_id)
    .bind(order_id)
    .fetch_one(conn)
    .await
}

pub async fn delete_order(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM orders WHERE id = ?").bind(order_id).execute(conn).await?;
    Ok(res.rows_affected() > 0)
}

/// The order total is computed, never stored: `Σ(quantity × price)` over the order's items.
const SUMMARY_SELECT: &str = r#"
    SELECT
        o.id, o.user_id, o.state, o.contact_id, o.created_at,
        COALESCE(SUM(oi.quantity * pi.price), 0) AS total
    FROM orders o
        JOIN order_items oi ON oi.order_id = o.id
        JOIN product_infos pi ON pi.id = oi.product_info_id
"#;

pub async fn fetch_order_summaries_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderSummary>, sqlx::Error> {
    let sql = format!(
        "{SUMMARY_SELECT} WHERE o.user_id = ? AND o.state != 'basket' GROUP BY o.id ORDER BY o.created_at DESC"
    );
    sqlx::query_as(&sql).bind(user_id).fetch_all(conn).await
}

/// Orders seen from the supplier side: every non-basket order with at least one item stocked by a shop owned by
/// `user_id`. Totals still cover the whole order.
pub async fn fetch_order_summaries_for_supplier(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderSummary>, sqlx::Error> {
    let sql = format!(
        r#"{SUMMARY_SELECT}
        WHERE o.state != 'basket' AND o.id IN (
            SELECT oi2.order_id
            FROM order_items oi2
                JOIN product_infos pi2 ON pi2.id = oi2.product_info_id
                JOIN shops s ON s.id = pi2.shop_id
            WHERE s.user_id = ?
        )
        GROUP BY o.id ORDER BY o.created_at DESC"#
    );
    sqlx::query_as(&sql).bind(user_id).fetch_all(conn).await
}

pub async fn fetch_basket_summary(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderSummary>, sqlx::Error> {
    let sql = format!("{SUMMARY_SELECT} WHERE o.user_id = ? AND o.state = 'basket' GROUP BY o.id");
    sqlx::query_as(&sql).bind(user_id).fetch_optional(conn).await
}
