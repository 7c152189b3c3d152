//! `SqliteDatabase` is a concrete implementation of a Supply Gateway engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module. Every mutating flow runs inside a single transaction, so a failure anywhere leaves the previous
//! committed state fully intact.
use std::fmt::Debug;

use log::*;
use sqlx::{Error as SqlxError, SqlitePool};

use super::db::{catalog, contacts, db_url, new_pool, orders, shops, stock};
use crate::{
    db_types::{
        BasketItem,
        Category,
        Contact,
        ContactUpdate,
        NewContact,
        Order,
        OrderState,
        ParameterValue,
        ProductInfo,
        QuantityUpdate,
        Shop,
    },
    feed::{FeedSource, PriceList},
    traits::{
        BasketRemoval,
        BasketView,
        CatalogApiError,
        CatalogEntry,
        CatalogManagement,
        CatalogQueryFilter,
        IngestError,
        IngestSummary,
        OrderFlowError,
        OrderSummary,
        SupplyGatewayDatabase,
    },
};

/// How many times a placement transaction is retried when SQLite reports contention before giving up.
const MAX_PLACEMENT_RETRIES: usize = 3;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, reading the URL from `SG_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, SqlxError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqlxError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn is_unique_violation(e: &SqlxError) -> bool {
        matches!(e, SqlxError::Database(de) if de.is_unique_violation())
    }

    fn is_fk_violation(e: &SqlxError) -> bool {
        matches!(e, SqlxError::Database(de) if de.is_foreign_key_violation())
    }

    fn is_busy(e: &OrderFlowError) -> bool {
        matches!(e, OrderFlowError::DatabaseError(msg) if msg.contains("database is locked"))
    }

    async fn try_place_order(
        &self,
        user_id: i64,
        order_id: i64,
        contact_id: i64,
    ) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_for_user(order_id, user_id, &mut tx)
            .await?
            .filter(|o| o.state == OrderState::Basket)
            .ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if !contacts::contact_belongs_to_user(contact_id, user_id, &mut tx).await? {
            return Err(OrderFlowError::InvalidContact(contact_id));
        }
        let items = orders::fetch_order_items(order.id, &mut tx).await?;
        if items.is_empty() {
            return Err(OrderFlowError::EmptyBasket(order_id));
        }
        for item in &items {
            if !stock::debit_stock(item.product_info_id, item.quantity, &mut tx).await? {
                // Dropping the transaction rolls back any debits already applied for earlier items.
                let available = stock::available_quantity(item.product_info_id, &mut tx).await?;
                return Err(OrderFlowError::InsufficientStock {
                    product_info_id: item.product_info_id,
                    requested: item.quantity,
                    available,
                });
            }
        }
        let order = orders::mark_placed(order.id, contact_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} placed for user {user_id}: {} items debited", items.len());
        Ok(order)
    }
}

impl SupplyGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn replace_price_list(
        &self,
        user_id: i64,
        origin: &FeedSource,
        list: &PriceList,
    ) -> Result<IngestSummary, IngestError> {
        let mut tx = self.pool.begin().await?;
        let shop = match shops::fetch_shop_by_name(&list.shop, &mut tx).await? {
            Some(shop) if shop.user_id == Some(user_id) => shop,
            Some(_) => {
                return Err(IngestError::Conflict(format!("shop '{}' is registered to another user", list.shop)))
            },
            None => shops::insert_shop(&list.shop, user_id, &mut tx).await.map_err(|e| {
                if Self::is_unique_violation(&e) {
                    IngestError::Conflict(format!("user {user_id} already owns a different shop"))
                } else {
                    e.into()
                }
            })?,
        };
        shops::record_feed_origin(shop.id, origin.url_ref(), origin.filename(), &mut tx).await?;

        for category in &list.categories {
            catalog::upsert_category(category.id, &category.name, &mut tx).await?;
            catalog::link_category_to_shop(category.id, shop.id, &mut tx).await?;
        }

        // Full replacement: stale listings must not survive a re-ingestion.
        stock::clear_shop_stock(shop.id, &mut tx).await?;
        let mut summary = IngestSummary {
            shop_id: shop.id,
            categories: list.categories.len() as u64,
            ..Default::default()
        };
        for good in &list.goods {
            catalog::upsert_product(good.id, &good.name, good.category, &mut tx).await?;
            let info_id = stock::insert_product_info(shop.id, good, &mut tx).await?;
            for (name, value) in &good.parameters {
                let parameter_id = catalog::upsert_parameter(name, &mut tx).await?;
                catalog::insert_product_parameter(info_id, parameter_id, value, &mut tx).await?;
                summary.parameters += 1;
            }
            summary.products += 1;
        }
        tx.commit().await?;
        debug!(
            "🗃️ Price list for shop '{}' replaced: {} goods, {} categories",
            list.shop, summary.products, summary.categories
        );
        Ok(summary)
    }

    async fn add_basket_items(&self, user_id: i64, items: &[BasketItem]) -> Result<u64, OrderFlowError> {
        // An empty request must not leave an empty basket order behind.
        if items.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let basket = orders::fetch_or_create_basket(user_id, &mut tx).await?;
        let mut created = 0;
        for item in items {
            orders::insert_order_item(basket.id, item.product_info, item.quantity, &mut tx).await.map_err(
                |e| {
                    if Self::is_unique_violation(&e) {
                        OrderFlowError::DuplicateItem(item.product_info)
                    } else {
                        e.into()
                    }
                },
            )?;
            created += 1;
        }
        tx.commit().await?;
        trace!("🗃️ Added {created} items to basket #{} of user {user_id}", basket.id);
        Ok(created)
    }

    async fn update_basket_items(&self, user_id: i64, updates: &[QuantityUpdate]) -> Result<u64, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let basket = match orders::fetch_basket_order(user_id, &mut tx).await? {
            Some(b) => b,
            None => return Ok(0),
        };
        let mut updated = 0;
        for update in updates {
            if orders::update_item_quantity(basket.id, update.id, update.quantity, &mut tx).await? {
                updated += 1;
            }
        }
        tx.commit().await?;
        Ok(updated)
    }

    async fn remove_basket_items(&self, user_id: i64, item_ids: &[i64]) -> Result<BasketRemoval, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let basket = match orders::fetch_basket_order(user_id, &mut tx).await? {
            Some(b) => b,
            None => return Ok(BasketRemoval::default()),
        };
        let mut result = BasketRemoval::default();
        for item_id in item_ids {
            if orders::delete_order_item(basket.id, *item_id, &mut tx).await? {
                result.removed += 1;
            }
        }
        if orders::count_order_items(basket.id, &mut tx).await? == 0 {
            orders::delete_order(basket.id, &mut tx).await?;
            result.basket_deleted = true;
            trace!("🗃️ Basket #{} of user {user_id} emptied and deleted", basket.id);
        }
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_basket(&self, user_id: i64) -> Result<Option<BasketView>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_basket_summary(user_id, &mut conn).await? {
            Some(o) => o,
            None => return Ok(None),
        };
        let items = orders::fetch_order_items(order.id, &mut conn).await?;
        Ok(Some(BasketView { order, items }))
    }

    async fn place_order(&self, user_id: i64, order_id: i64, contact_id: i64) -> Result<Order, OrderFlowError> {
        let mut attempt = 0;
        loop {
            match self.try_place_order(user_id, order_id, contact_id).await {
                Err(e) if Self::is_busy(&e) && attempt < MAX_PLACEMENT_RETRIES => {
                    attempt += 1;
                    warn!("🗃️ Placement of order #{order_id} hit contention (attempt {attempt}): {e}");
                    tokio::time::sleep(std::time::Duration::from_millis(25 * attempt as u64)).await;
                },
                other => return other,
            }
        }
    }

    async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Option<i64>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_for_user(order_id, user_id, &mut tx)
            .await?
            .filter(|o| o.state == OrderState::New);
        let order = match order {
            Some(o) => o,
            // Already canceled, still a basket, or never existed: a no-op, reported as "not found".
            None => return Ok(None),
        };
        let items = orders::fetch_order_items(order.id, &mut tx).await?;
        for item in &items {
            stock::credit_stock(item.product_info_id, item.quantity, &mut tx).await?;
        }
        orders::delete_order(order.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} canceled for user {user_id}: {} items credited back", items.len());
        Ok(Some(order.id))
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderSummary>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_summaries_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_orders_for_supplier(&self, user_id: i64) -> Result<Vec<OrderSummary>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_summaries_for_supplier(user_id, &mut conn).await?)
    }

    async fn set_accepting_orders(&self, user_id: i64, accepting: bool) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(shops::set_accepting_orders(user_id, accepting, &mut conn).await?)
    }

    // Contact writes use explicit transactions even for single statements: `RETURNING` resolves on the first row,
    // before an implicit transaction's commit is visible to the other pooled connections.
    async fn insert_contact(&self, contact: NewContact) -> Result<Contact, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let contact = contacts::insert_contact(&contact, &mut tx).await?;
        tx.commit().await?;
        Ok(contact)
    }

    async fn update_contact(
        &self,
        user_id: i64,
        contact_id: i64,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let contact = contacts::update_contact(user_id, contact_id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(contact)
    }

    async fn delete_contacts(&self, user_id: i64, contact_ids: &[i64]) -> Result<u64, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;
        for contact_id in contact_ids {
            match contacts::delete_contact(user_id, *contact_id, &mut tx).await {
                Ok(true) => deleted += 1,
                Ok(false) => {},
                // Orders reference contacts without a delete action, so a contact attached to a placed order
                // cannot be removed.
                Err(e) if Self::is_fk_violation(&e) => {
                    return Err(CatalogApiError::ContactInUse(*contact_id));
                },
                Err(e) => return Err(e.into()),
            }
        }
        tx.commit().await?;
        Ok(deleted)
    }

    async fn close(&mut self) -> Result<(), CatalogApiError> {
        self.pool.close().await;
        Ok(())
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn search_catalog(&self, filter: CatalogQueryFilter) -> Result<Vec<CatalogEntry>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::search_catalog(filter, &mut conn).await?)
    }

    async fn fetch_product_info(&self, product_info_id: i64) -> Result<Option<ProductInfo>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(stock::fetch_product_info(product_info_id, &mut conn).await?)
    }

    async fn fetch_parameters(&self, product_info_id: i64) -> Result<Vec<ParameterValue>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_parameters_for_info(product_info_id, &mut conn).await?)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_categories(&mut conn).await?)
    }

    async fn fetch_shops(&self) -> Result<Vec<Shop>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(shops::fetch_accepting_shops(&mut conn).await?)
    }

    async fn fetch_shop_for_user(&self, user_id: i64) -> Result<Option<Shop>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(shops::fetch_shop_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_contacts_for_user(&self, user_id: i64) -> Result<Vec<Contact>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(contacts::fetch_contacts_for_user(user_id, &mut conn).await?)
    }
}
