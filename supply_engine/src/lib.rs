//! Supply Gateway Engine
//!
//! The Supply Gateway Engine is the core of a supplier-catalog and order-fulfillment service. Suppliers ("shops")
//! publish a structured price list, buyers browse the merged catalog, build a basket, and place orders that are
//! reconciled against live stock. This library contains the core logic only; it is transport-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the database directly.
//!    Instead, use the public API provided by the engine. The exception is the data types used in the database,
//!    which are defined in the [`db_types`] module and are public.
//! 2. The engine public API ([`mod@sg_api`]). This provides the public-facing functionality: price-list ingestion
//!    ([`IngestApi`]), the basket/order state machine ([`OrderFlowApi`]), and catalog browsing ([`CatalogApi`]).
//!    Specific backends need to implement the traits in the [`mod@traits`] module in order to drive these APIs.
//! 3. Feed handling ([`mod@feed`]): the supplier price-list document, and loading it from a file or a URL.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted when certain actions
//! occur within the engine, for example when an order is placed, an `OrderPlacedEvent` is emitted. A simple actor
//! framework is used so that you can easily hook into these events and dispatch notifications. Delivery is entirely
//! the subscriber's concern; the engine only ever enqueues identifiers.

pub mod db_types;
pub mod events;
pub mod feed;
pub mod sg_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use sg_api::{CatalogApi, IngestApi, OrderFlowApi};
pub use traits::{
    CatalogApiError,
    CatalogManagement,
    IngestError,
    OrderFlowError,
    SupplyGatewayDatabase,
};
