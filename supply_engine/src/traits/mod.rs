//! # Backend contracts.
//!
//! This module defines the interface contracts that database *backends* must implement in order to power the
//! Supply Gateway engine, together with the error taxonomy the APIs surface.
//!
//! * [`SupplyGatewayDatabase`] defines the mutating behaviour: atomic price-list replacement, basket editing,
//!   and the place/cancel stock reconciliation flows.
//! * [`CatalogManagement`] provides read-only queries over the merged catalog, shops, and contacts.
//!
//! Every mutating operation is transactional: a failure leaves no partial state behind, and no failure here is
//! fatal to the process — each is scoped to a single operation.

mod catalog_management;
mod data_objects;
mod errors;
mod supply_gateway_database;

pub use catalog_management::{CatalogManagement, CatalogQueryFilter};
pub use data_objects::{BasketRemoval, BasketView, CatalogEntry, IngestSummary, OrderSummary};
pub use errors::{CatalogApiError, IngestError, OrderFlowError};
pub use supply_gateway_database::SupplyGatewayDatabase;
