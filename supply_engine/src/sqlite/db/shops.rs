use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::Shop;

pub async fn fetch_shop_by_name(name: &str, conn: &mut SqliteConnection) -> Result<Option<Shop>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM shops WHERE name = ?")
        .bind(name)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_shop_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Shop>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM shops WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

pub async fn insert_shop(name: &str, user_id: i64, conn: &mut SqliteConnection) -> Result<Shop, sqlx::Error> {
    trace!("🗃️ Registering new shop '{name}' for user {user_id}");
    sqlx::query_as("INSERT INTO shops (name, user_id) VALUES (?, ?) RETURNING *")
        .bind(name)
        .bind(user_id)
        .fetch_one(conn)
        .await
}

/// Records where the shop's last feed came from. Exactly one of url/filename is usually set.
pub async fn record_feed_origin(
    shop_id: i64,
    url: Option<&str>,
    filename: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    let _ = sqlx::query(
        "UPDATE shops SET url = ?, filename = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(url)
    .bind(filename)
    .bind(shop_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Returns true if the user owned a shop and its flag was written.
pub async fn set_accepting_orders(
    user_id: i64,
    accepting: bool,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE shops SET accepting_orders = ?, updated_at = CURRENT_TIMESTAMP WHERE user_id = ?",
    )
    .bind(accepting)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(res.rows_affected() > 0)
}

/// Shops visible in the public catalog, i.e. those accepting orders.
pub async fn fetch_accepting_shops(conn: &mut SqliteConnection) -> Result<Vec<Shop>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM shops WHERE accepting_orders = 1 ORDER BY name")
        .fetch_all(conn)
        .await
}
