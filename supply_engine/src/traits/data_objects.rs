use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::{Money, OrderItem, OrderState};

/// What one price-list ingestion did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub shop_id: i64,
    pub categories: u64,
    pub products: u64,
    pub parameters: u64,
}

/// Result of removing items from a basket. When the last item goes, the order row goes with it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BasketRemoval {
    pub removed: u64,
    pub basket_deleted: bool,
}

/// An order as presented in listings, with its computed total `Σ(quantity × price)`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub user_id: i64,
    pub state: OrderState,
    pub contact_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub total: Money,
}

/// The caller's open basket with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketView {
    pub order: OrderSummary,
    pub items: Vec<OrderItem>,
}

/// One row of the merged catalog: a stock record joined with its product, category and shop.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub model: String,
    pub quantity: i64,
    pub price: Money,
    pub price_rrc: Money,
    pub product_id: i64,
    pub product_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub shop_id: i64,
    pub shop_name: String,
}
