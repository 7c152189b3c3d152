use crate::{
    db_types::{BasketItem, Contact, ContactUpdate, NewContact, Order, QuantityUpdate},
    feed::{FeedSource, PriceList},
    traits::{
        BasketRemoval,
        BasketView,
        CatalogApiError,
        CatalogManagement,
        IngestError,
        IngestSummary,
        OrderFlowError,
        OrderSummary,
    },
};

/// This trait defines the highest level of behaviour for backends supporting the Supply Gateway engine.
///
/// This behaviour includes:
/// * Atomically replacing a shop's stock listing from a supplier price list.
/// * Editing a user's open basket.
/// * The place/cancel order flows, which debit and credit the stock ledger.
/// * Order listings for buyers and suppliers.
///
/// Callers must serialize ingestions per shop (the [`crate::IngestApi`] does this with a per-owner lock), because a
/// replacement is a delete-then-insert window even inside its transaction.
#[allow(async_fn_in_trait)]
pub trait SupplyGatewayDatabase: Clone + CatalogManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Replaces the entire stock listing of the shop named in `list` in a single atomic transaction:
    /// * resolves or creates the shop for `user_id` and records the feed origin on it,
    /// * upserts categories by feed id (last-writer-wins on name) and adds shop membership (additive only),
    /// * deletes every stock record of this shop, then inserts a fresh record per good,
    /// * upserts products by feed id (existing rows retained) and parameters by name.
    ///
    /// A shop name registered to a different user, or a second shop for a user that already owns one, fails with
    /// [`IngestError::Conflict`] and no mutation is applied.
    async fn replace_price_list(
        &self,
        user_id: i64,
        origin: &FeedSource,
        list: &PriceList,
    ) -> Result<IngestSummary, IngestError>;

    /// Adds items to the user's open basket, creating the basket order if necessary. A duplicate
    /// `(order, product_info)` pair fails the whole call with [`OrderFlowError::DuplicateItem`]; use
    /// [`Self::update_basket_items`] to change quantities. Quantities here are a request, not a debit.
    ///
    /// Returns the number of items inserted.
    async fn add_basket_items(&self, user_id: i64, items: &[BasketItem]) -> Result<u64, OrderFlowError>;

    /// Sets the quantity of existing basket lines, keyed by order-item id and scoped to the caller's basket.
    /// Unknown ids are skipped. Returns the number of lines updated.
    async fn update_basket_items(&self, user_id: i64, updates: &[QuantityUpdate]) -> Result<u64, OrderFlowError>;

    /// Deletes basket lines by order-item id, scoped to the caller's basket. If the basket empties, the order row
    /// is deleted too. Safe to retry: ids that are already gone are skipped.
    async fn remove_basket_items(&self, user_id: i64, item_ids: &[i64]) -> Result<BasketRemoval, OrderFlowError>;

    /// The user's open basket with items and total, or `None` if they have none.
    async fn fetch_basket(&self, user_id: i64) -> Result<Option<BasketView>, OrderFlowError>;

    /// Transition `basket → new`. In one transaction, verifies the contact belongs to the user, debits stock for
    /// every item with a guarded compare-and-swap, attaches the contact and sets the state. Insufficient stock for
    /// any item aborts the entire transition with no mutation.
    async fn place_order(&self, user_id: i64, order_id: i64, contact_id: i64) -> Result<Order, OrderFlowError>;

    /// Transition `new → canceled`. Credits stock back for every item and deletes the order (cascading its items).
    /// An order that is not in state `new` for this user is a no-op reported as `Ok(None)`, so retries are safe.
    /// Returns the canceled order id otherwise.
    async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Option<i64>, OrderFlowError>;

    /// All non-basket orders of the user, newest first, with computed totals.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderSummary>, OrderFlowError>;

    /// All non-basket orders containing at least one item whose stock record belongs to a shop owned by `user_id`.
    async fn fetch_orders_for_supplier(&self, user_id: i64) -> Result<Vec<OrderSummary>, OrderFlowError>;

    /// Toggles whether the user's shop accepts orders. Returns false if the user owns no shop.
    async fn set_accepting_orders(&self, user_id: i64, accepting: bool) -> Result<bool, CatalogApiError>;

    /// Stores a new delivery contact for a user.
    async fn insert_contact(&self, contact: NewContact) -> Result<Contact, CatalogApiError>;

    /// Applies a partial update to a contact owned by the user. Returns the updated row, or `None` if the contact
    /// does not exist or belongs to someone else.
    async fn update_contact(
        &self,
        user_id: i64,
        contact_id: i64,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, CatalogApiError>;

    /// Deletes contacts by id, scoped to the owner. Returns the number deleted. A contact still referenced by a
    /// placed order fails the whole call with [`CatalogApiError::ContactInUse`] and nothing is deleted.
    async fn delete_contacts(&self, user_id: i64, contact_ids: &[i64]) -> Result<u64, CatalogApiError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), CatalogApiError> {
        Ok(())
    }
}
