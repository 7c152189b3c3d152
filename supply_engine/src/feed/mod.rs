//! Supplier price-list feeds.
//!
//! A feed is the structured document a shop submits to replace its catalog. It can live on disk or behind a URL
//! ([`FeedSource`]), and is parsed into a [`PriceList`] before any database work happens, so a malformed document
//! never touches existing stock.

mod data_objects;
mod source;

use thiserror::Error;

pub use data_objects::{FeedCategory, FeedGood, PriceList};
pub use source::FeedSource;

#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("The feed failed validation: {0}")]
    Validation(String),
    #[error("The feed source is unavailable: {0}")]
    SourceUnavailable(String),
}
