use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

pub use sg_common::Money;

//--------------------------------------     OrderState      ---------------------------------------------------------
/// Lifecycle states for an [`Order`].
///
/// `Basket` is the initial, mutable cart. Placing the order moves it to `New` and debits stock. The supplier-driven
/// progression (`Confirmed`, `Assembly`, `Sent`, `Delivered`) never mutates stock again and is advanced by an
/// external actor. `Canceled` is terminal and credits stock back. There is no path back to `Basket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Basket,
    New,
    Confirmed,
    Assembly,
    Sent,
    Delivered,
    Canceled,
}

impl Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderState::Basket => "basket",
            OrderState::New => "new",
            OrderState::Confirmed => "confirmed",
            OrderState::Assembly => "assembly",
            OrderState::Sent => "sent",
            OrderState::Delivered => "delivered",
            OrderState::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order state: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderState {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basket" => Ok(Self::Basket),
            "new" => Ok(Self::New),
            "confirmed" => Ok(Self::Confirmed),
            "assembly" => Ok(Self::Assembly),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "canceled" => Ok(Self::Canceled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderState {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order state: {value}. But this conversion cannot fail. Defaulting to Basket");
            OrderState::Basket
        })
    }
}

//--------------------------------------        Shop         ---------------------------------------------------------
/// A supplier tenant. Created on the first successful ingestion for its owner and updated in place afterwards,
/// never auto-deleted. `accepting_orders` gates catalog visibility.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Shop {
    pub id: i64,
    pub name: String,
    pub url: Option<String>,
    pub filename: Option<String>,
    pub accepting_orders: bool,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Category       ---------------------------------------------------------
/// Shared cross-shop reference data. The id is supplied by supplier feeds and acts as the merge key.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

//--------------------------------------       Product       ---------------------------------------------------------
/// A catalog entry shared across shops. As with categories, the feed-supplied id is the merge key, so colliding ids
/// from different shops alias to one row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

//--------------------------------------     ProductInfo     ---------------------------------------------------------
/// The shop-specific stock record. This is the only mutable quantity ledger in the system: `quantity` always
/// reflects currently available stock, net of every placed (non-canceled, non-basket) order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: i64,
    pub product_id: i64,
    pub shop_id: i64,
    pub model: String,
    pub quantity: i64,
    pub price: Money,
    pub price_rrc: Money,
}

//--------------------------------------      Parameter      ---------------------------------------------------------
/// A shared, named product attribute (e.g. "color"), merged by name across shops.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Parameter {
    pub id: i64,
    pub name: String,
}

/// A (stock record, parameter) -> value binding, unique per pair.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductParameter {
    pub id: i64,
    pub product_info_id: i64,
    pub parameter_id: i64,
    pub value: String,
}

/// A parameter name/value pair as presented to catalog browsers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ParameterValue {
    pub name: String,
    pub value: String,
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub state: OrderState,
    pub contact_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
/// One line of an order. Unique per `(order_id, product_info_id)`: a basket may not list the same stock record
/// twice. The quantity is a request until the order is placed, at which point it becomes a debit against stock.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_info_id: i64,
    pub quantity: i64,
}

/// A requested basket line, keyed by stock record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketItem {
    pub product_info: i64,
    pub quantity: i64,
}

/// A quantity change for an existing basket line, keyed by order-item id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub id: i64,
    pub quantity: i64,
}

//--------------------------------------       Contact       ---------------------------------------------------------
/// A delivery address and phone number. Owned by a user and referenced, never owned, by orders.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub user_id: i64,
    pub city: String,
    pub street: String,
    pub house: String,
    pub building: String,
    pub structure: String,
    pub apartment: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContact {
    pub user_id: i64,
    pub city: String,
    pub street: String,
    pub house: String,
    pub building: String,
    pub structure: String,
    pub apartment: String,
    pub phone: String,
}

impl NewContact {
    pub fn new(user_id: i64, city: &str, street: &str, phone: &str) -> Self {
        Self {
            user_id,
            city: city.to_string(),
            street: street.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }
}

/// A partial update for a contact. Only the populated fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactUpdate {
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub building: Option<String>,
    pub structure: Option<String>,
    pub apartment: Option<String>,
    pub phone: Option<String>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() &&
            self.street.is_none() &&
            self.house.is_none() &&
            self.building.is_none() &&
            self.structure.is_none() &&
            self.apartment.is_none() &&
            self.phone.is_none()
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }

    pub fn with_street(mut self, street: &str) -> Self {
        self.street = Some(street.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }
}

#[cfg(test)]
mod test {
    use super::OrderState;

    #[test]
    fn order_state_round_trip() {
        for state in [
            OrderState::Basket,
            OrderState::New,
            OrderState::Confirmed,
            OrderState::Assembly,
            OrderState::Sent,
            OrderState::Delivered,
            OrderState::Canceled,
        ] {
            let s = state.to_string();
            assert_eq!(s.parse::<OrderState>().unwrap(), state);
        }
    }

    #[test]
    fn unknown_state_falls_back_to_basket() {
        assert_eq!(OrderState::from("in_process".to_string()), OrderState::Basket);
    }
}
