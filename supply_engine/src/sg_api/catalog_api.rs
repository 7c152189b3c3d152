use sg_common::parse_boolean_flag;

use crate::{
    db_types::{Category, Contact, ContactUpdate, NewContact, ParameterValue, ProductInfo, Shop},
    traits::{CatalogApiError, CatalogEntry, CatalogManagement, CatalogQueryFilter, SupplyGatewayDatabase},
};

/// `CatalogApi` provides read access to the merged catalog, plus the small amount of account-adjacent state the
/// gateway keeps (delivery contacts and the shop's accepting-orders switch).
#[derive(Debug, Clone)]
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: SupplyGatewayDatabase + CatalogManagement
{
    /// Searches listings across all shops that are accepting orders, optionally narrowed by shop, category or
    /// product.
    pub async fn search(&self, filter: CatalogQueryFilter) -> Result<Vec<CatalogEntry>, CatalogApiError> {
        self.db.search_catalog(filter).await
    }

    pub async fn product_info(&self, product_info_id: i64) -> Result<Option<ProductInfo>, CatalogApiError> {
        self.db.fetch_product_info(product_info_id).await
    }

    /// The name/value parameter pairs attached to one stock record.
    pub async fn parameters(&self, product_info_id: i64) -> Result<Vec<ParameterValue>, CatalogApiError> {
        self.db.fetch_parameters(product_info_id).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, CatalogApiError> {
        self.db.fetch_categories().await
    }

    /// Shops currently accepting orders.
    pub async fn shops(&self) -> Result<Vec<Shop>, CatalogApiError> {
        self.db.fetch_shops().await
    }

    pub async fn shop_for_user(&self, user_id: i64) -> Result<Option<Shop>, CatalogApiError> {
        self.db.fetch_shop_for_user(user_id).await
    }

    /// Switches the supplier's shop in or out of the catalog. Returns false if the user owns no shop.
    pub async fn set_accepting_orders(&self, user_id: i64, accepting: bool) -> Result<bool, CatalogApiError> {
        self.db.set_accepting_orders(user_id, accepting).await
    }

    /// As [`Self::set_accepting_orders`], but takes the flag as submitted ("on", "1", "false", …). An absent or
    /// unrecognised flag leaves the shop open for orders.
    pub async fn set_accepting_orders_flag(
        &self,
        user_id: i64,
        flag: Option<String>,
    ) -> Result<bool, CatalogApiError> {
        let accepting = parse_boolean_flag(flag, true);
        self.db.set_accepting_orders(user_id, accepting).await
    }

    pub async fn contacts(&self, user_id: i64) -> Result<Vec<Contact>, CatalogApiError> {
        self.db.fetch_contacts_for_user(user_id).await
    }

    pub async fn add_contact(&self, contact: NewContact) -> Result<Contact, CatalogApiError> {
        self.db.insert_contact(contact).await
    }

    pub async fn update_contact(
        &self,
        user_id: i64,
        contact_id: i64,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, CatalogApiError> {
        self.db.update_contact(user_id, contact_id, update).await
    }

    pub async fn delete_contacts(&self, user_id: i64, contact_ids: &[i64]) -> Result<u64, CatalogApiError> {
        self.db.delete_contacts(user_id, contact_ids).await
    }
}
