use serde::{Deserialize, Serialize};

/// Fired when a new user account has been registered. The engine itself never produces this; the producer is
/// exposed for the account boundary sitting in front of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegisteredEvent {
    pub user_id: i64,
}

impl UserRegisteredEvent {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Fired after an order commits the `basket → new` transition. Events carry identifiers only; subscribers
/// re-fetch whatever display data they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub user_id: i64,
    pub order_id: i64,
}

impl OrderPlacedEvent {
    pub fn new(user_id: i64, order_id: i64) -> Self {
        Self { user_id, order_id }
    }
}

/// Fired after an order is canceled and its stock credited back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCanceledEvent {
    pub user_id: i64,
    pub order_id: i64,
}

impl OrderCanceledEvent {
    pub fn new(user_id: i64, order_id: i64) -> Self {
        Self { user_id, order_id }
    }
}

/// Fired after a supplier's price list has been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListUpdatedEvent {
    pub user_id: i64,
    pub shop_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    UserRegistered(UserRegisteredEvent),
    OrderPlaced(OrderPlacedEvent),
    OrderCanceled(OrderCanceledEvent),
    PriceListUpdated(PriceListUpdatedEvent),
}
