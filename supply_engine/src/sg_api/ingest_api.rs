use std::{collections::HashMap, fmt::Debug, sync::Arc};

use log::*;
use tokio::sync::Mutex;

use crate::{
    events::{EventProducers, PriceListUpdatedEvent},
    feed::FeedSource,
    traits::{IngestError, IngestSummary, SupplyGatewayDatabase},
};

/// `IngestApi` drives the price-list ingestion flow: load a feed from its source, parse and validate it, and hand
/// it to the backend for atomic replacement of the shop's stock listing.
///
/// Ingestions are serialized per supplier with an in-process lock, so a supplier re-submitting while a previous
/// upload is still running waits rather than interleaving two replacements of the same shop.
pub struct IngestApi<B> {
    db: B,
    producers: EventProducers,
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl<B> Debug for IngestApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IngestApi")
    }
}

impl<B> IngestApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, locks: Mutex::new(HashMap::new()) }
    }

    async fn lock_for_user(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(user_id).or_default())
    }
}

impl<B> IngestApi<B>
where B: SupplyGatewayDatabase
{
    /// Replaces the stock listing of the supplier's shop with the contents of the feed at `source`.
    ///
    /// The feed is fetched and validated before any database work starts, so an unreachable source or a malformed
    /// feed leaves the current listing untouched.
    pub async fn update_price_list(&self, user_id: i64, source: FeedSource) -> Result<IngestSummary, IngestError> {
        let lock = self.lock_for_user(user_id).await;
        let _guard = lock.lock().await;
        debug!("📥️ Loading price list feed from {source} for user {user_id}");
        let list = source.load().await?;
        info!("📥️ Feed for shop '{}' loaded: {} goods in {} categories", list.shop, list.goods.len(), list.categories.len());
        let summary = self.db.replace_price_list(user_id, &source, &list).await?;
        self.call_price_list_updated_hook(user_id, &summary).await;
        info!(
            "📥️ Price list for shop #{} replaced: {} products, {} parameter values",
            summary.shop_id, summary.products, summary.parameters
        );
        Ok(summary)
    }

    async fn call_price_list_updated_hook(&self, user_id: i64, summary: &IngestSummary) {
        for emitter in &self.producers.price_list_updated_producer {
            trace!("📥️ Notifying price list hook subscribers");
            let event = PriceListUpdatedEvent { user_id, shop_id: summary.shop_id };
            emitter.publish_event(event).await;
        }
    }
}
