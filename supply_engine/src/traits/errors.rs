use thiserror::Error;

use crate::feed::FeedError;

/// Failures of the price-list ingestion flow. Any of these roll back the entire replacement; the prior stock
/// listing stays intact.
#[derive(Debug, Clone, Error)]
pub enum IngestError {
    #[error("The feed is malformed: {0}")]
    Validation(String),
    #[error("The feed source is unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Conflicting shop registration: {0}")]
    Conflict(String),
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<FeedError> for IngestError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::Validation(msg) => IngestError::Validation(msg),
            FeedError::SourceUnavailable(msg) => IngestError::SourceUnavailable(msg),
        }
    }
}

impl From<sqlx::Error> for IngestError {
    fn from(e: sqlx::Error) -> Self {
        IngestError::DatabaseError(e.to_string())
    }
}

/// Failures of the basket/order state machine.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Requested {requested} units of stock record {product_info_id}, but only {available} are available")]
    InsufficientStock { product_info_id: i64, requested: i64, available: i64 },
    #[error("Contact {0} does not exist or belongs to another user")]
    InvalidContact(i64),
    #[error("The basket already contains stock record {0}")]
    DuplicateItem(i64),
    #[error("Order {0} does not exist or is not accessible")]
    OrderNotFound(i64),
    #[error("Order {0} has no items")]
    EmptyBasket(i64),
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

/// Failures of catalog queries and the contact/supplier-state operations.
#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
    #[error("Contact {0} is attached to an order and cannot be deleted")]
    ContactInUse(i64),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}
