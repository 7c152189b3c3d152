use crate::{
    db_types::{Category, Contact, ParameterValue, ProductInfo, Shop},
    traits::{CatalogApiError, CatalogEntry},
};

/// Criteria for searching the merged catalog. Only shops currently accepting orders are ever listed.
#[derive(Debug, Clone, Default)]
pub struct CatalogQueryFilter {
    pub(crate) shop_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) product_id: Option<i64>,
}

impl CatalogQueryFilter {
    pub fn with_shop_id(mut self, shop_id: i64) -> Self {
        self.shop_id = Some(shop_id);
        self
    }

    pub fn with_category_id(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_product_id(mut self, product_id: i64) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.shop_id.is_none() && self.category_id.is_none() && self.product_id.is_none()
    }
}

/// Read-only queries over the catalog store. These never mutate anything and can run on a plain pool connection.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    /// Searches stock records of shops that are accepting orders, per the given filter.
    async fn search_catalog(&self, filter: CatalogQueryFilter) -> Result<Vec<CatalogEntry>, CatalogApiError>;

    /// Fetches a single stock record, regardless of shop state. Returns `None` if it does not exist.
    async fn fetch_product_info(&self, product_info_id: i64) -> Result<Option<ProductInfo>, CatalogApiError>;

    /// Parameter name/value pairs for a stock record.
    async fn fetch_parameters(&self, product_info_id: i64) -> Result<Vec<ParameterValue>, CatalogApiError>;

    /// All known categories.
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogApiError>;

    /// Shops currently accepting orders.
    async fn fetch_shops(&self) -> Result<Vec<Shop>, CatalogApiError>;

    /// The shop owned by the given user, if any.
    async fn fetch_shop_for_user(&self, user_id: i64) -> Result<Option<Shop>, CatalogApiError>;

    /// The user's saved delivery contacts.
    async fn fetch_contacts_for_user(&self, user_id: i64) -> Result<Vec<Contact>, CatalogApiError>;
}
