pub mod catalog_api;
pub mod ingest_api;
pub mod order_flow_api;

pub use catalog_api::CatalogApi;
pub use ingest_api::IngestApi;
pub use order_flow_api::OrderFlowApi;
