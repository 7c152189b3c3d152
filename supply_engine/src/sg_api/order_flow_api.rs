use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{BasketItem, Order, QuantityUpdate},
    events::{EventProducers, OrderCanceledEvent, OrderPlacedEvent},
    traits::{BasketRemoval, BasketView, OrderFlowError, OrderSummary, SupplyGatewayDatabase},
};

/// `OrderFlowApi` is the primary API for the buyer side of the gateway: basket editing, the place and cancel
/// transitions, and order listings.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: SupplyGatewayDatabase
{
    /// Adds items to the user's basket, creating the basket if they have none. Adding a stock record that is
    /// already in the basket is rejected; use [`Self::update_basket_items`] to change quantities.
    pub async fn add_basket_items(&self, user_id: i64, items: &[BasketItem]) -> Result<u64, OrderFlowError> {
        let added = self.db.add_basket_items(user_id, items).await?;
        debug!("🛒️ Added {added} items to the basket of user {user_id}");
        Ok(added)
    }

    /// Sets new quantities on existing basket lines. Lines that do not exist in the caller's basket are skipped.
    pub async fn update_basket_items(&self, user_id: i64, updates: &[QuantityUpdate]) -> Result<u64, OrderFlowError> {
        self.db.update_basket_items(user_id, updates).await
    }

    /// Removes basket lines by id. An emptied basket is deleted outright.
    pub async fn remove_basket_items(&self, user_id: i64, item_ids: &[i64]) -> Result<BasketRemoval, OrderFlowError> {
        self.db.remove_basket_items(user_id, item_ids).await
    }

    /// The user's current basket with its computed total, or `None`.
    pub async fn fetch_basket(&self, user_id: i64) -> Result<Option<BasketView>, OrderFlowError> {
        self.db.fetch_basket(user_id).await
    }

    /// Places a basket order: reserves stock for every line and attaches the delivery contact. If any line cannot
    /// be covered, nothing is debited and the basket survives unchanged.
    ///
    /// Fires the order-placed hook after the transition has committed.
    pub async fn place_order(&self, user_id: i64, order_id: i64, contact_id: i64) -> Result<Order, OrderFlowError> {
        let order = self.db.place_order(user_id, order_id, contact_id).await?;
        info!("🛒️ Order #{order_id} placed by user {user_id}");
        self.call_order_placed_hook(order.user_id, order.id).await;
        Ok(order)
    }

    async fn call_order_placed_hook(&self, user_id: i64, order_id: i64) {
        for emitter in &self.producers.order_placed_producer {
            trace!("🛒️ Notifying order placed hook subscribers");
            let event = OrderPlacedEvent::new(user_id, order_id);
            emitter.publish_event(event).await;
        }
    }

    /// Cancels a placed order, crediting its stock back. Cancelling an order that is not in the `new` state (or
    /// not this user's) is a no-op that returns `Ok(None)`, so the call is safe to retry.
    ///
    /// Fires the order-canceled hook when a cancellation actually happened.
    pub async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Option<i64>, OrderFlowError> {
        let canceled = self.db.cancel_order(user_id, order_id).await?;
        match canceled {
            Some(id) => {
                info!("🛒️ Order #{id} canceled by user {user_id}");
                self.call_order_canceled_hook(user_id, id).await;
            },
            None => debug!("🛒️ Cancel request for order #{order_id} by user {user_id} was a no-op"),
        }
        Ok(canceled)
    }

    async fn call_order_canceled_hook(&self, user_id: i64, order_id: i64) {
        for emitter in &self.producers.order_canceled_producer {
            trace!("🛒️ Notifying order canceled hook subscribers");
            let event = OrderCanceledEvent::new(user_id, order_id);
            emitter.publish_event(event).await;
        }
    }

    /// All placed (non-basket) orders of the user, newest first.
    pub async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderSummary>, OrderFlowError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    /// All placed orders that touch stock belonging to the supplier's shop.
    pub async fn fetch_orders_for_supplier(&self, user_id: i64) -> Result<Vec<OrderSummary>, OrderFlowError> {
        self.db.fetch_orders_for_supplier(user_id).await
    }
}
