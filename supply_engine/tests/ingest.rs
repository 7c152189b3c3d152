//! Price-list ingestion against a real SQLite database: atomic replacement, shop isolation and ownership rules.
mod common;

use common::*;
use supply_engine::{
    feed::{FeedSource, PriceList},
    traits::{CatalogQueryFilter, IngestError},
    CatalogManagement,
    SupplyGatewayDatabase,
};

const SUPPLIER: i64 = 100;
const OTHER_SUPPLIER: i64 = 200;

#[tokio::test]
async fn ingesting_a_feed_builds_the_catalog() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;

    let entries = db.search_catalog(CatalogQueryFilter::default()).await.unwrap();
    assert_eq!(entries.len(), 2);

    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    assert_eq!(phone.quantity, 5);
    assert_eq!(phone.price.value(), 110_000);
    assert_eq!(phone.price_rrc.value(), 116_990);
    assert_eq!(phone.shop_name, "Связной");
    assert_eq!(phone.category_name, "Смартфоны");

    let params = db.fetch_parameters(phone.id).await.unwrap();
    assert_eq!(params.len(), 2);
    assert!(params.iter().any(|p| p.name == "Цвет" && p.value == "золотистый"));
    assert!(params.iter().any(|p| p.name == "Диагональ (дюйм)" && p.value == "6.5"));

    let categories = db.fetch_categories().await.unwrap();
    assert_eq!(categories.len(), 2);
}

#[tokio::test]
async fn reingestion_fully_replaces_the_listing() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let old_phone = stock_entry(&db, shop_id, PHONE_ID).await;

    // Second upload drops the cable and restocks the phone.
    let mut list = sample_feed("Связной");
    list.goods.retain(|g| g.id == PHONE_ID);
    list.goods[0].quantity = 9;
    let origin = FeedSource::url("https://example.com/100/pricelist.yaml");
    let summary = db.replace_price_list(SUPPLIER, &origin, &list).await.unwrap();
    assert_eq!(summary.shop_id, shop_id);
    assert_eq!(summary.products, 1);

    let entries = db.search_catalog(CatalogQueryFilter::default().with_shop_id(shop_id)).await.unwrap();
    assert_eq!(entries.len(), 1, "stale listings must not survive a re-ingestion");
    assert_eq!(entries[0].quantity, 9);
    // The old stock record is gone along with its parameters.
    assert!(db.fetch_product_info(old_phone.id).await.unwrap().is_none());
    assert!(db.fetch_parameters(old_phone.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn shops_do_not_clobber_each_other() {
    let db = new_test_db().await;
    let shop_a = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let shop_b = ingest_sample_feed(&db, OTHER_SUPPLIER, "Ситилинк").await;
    assert_ne!(shop_a, shop_b);

    // Both shops list the same feed product ids; each keeps its own stock records.
    let phone_a = stock_entry(&db, shop_a, PHONE_ID).await;
    let phone_b = stock_entry(&db, shop_b, PHONE_ID).await;
    assert_ne!(phone_a.id, phone_b.id);
    assert_eq!(phone_a.product_id, phone_b.product_id);

    // Re-ingesting shop B leaves shop A untouched.
    ingest_sample_feed(&db, OTHER_SUPPLIER, "Ситилинк").await;
    let entries = db.search_catalog(CatalogQueryFilter::default().with_shop_id(shop_a)).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(db.fetch_product_info(phone_a.id).await.unwrap().is_some());
}

#[tokio::test]
async fn shop_name_registered_to_another_user_is_a_conflict() {
    let db = new_test_db().await;
    ingest_sample_feed(&db, SUPPLIER, "Связной").await;

    let list = sample_feed("Связной");
    let origin = FeedSource::url("https://example.com/200/pricelist.yaml");
    let err = db.replace_price_list(OTHER_SUPPLIER, &origin, &list).await.unwrap_err();
    assert!(matches!(err, IngestError::Conflict(_)), "got {err}");
}

#[tokio::test]
async fn one_shop_per_supplier() {
    let db = new_test_db().await;
    ingest_sample_feed(&db, SUPPLIER, "Связной").await;

    let list = sample_feed("Второй магазин");
    let origin = FeedSource::url("https://example.com/100/other.yaml");
    let err = db.replace_price_list(SUPPLIER, &origin, &list).await.unwrap_err();
    assert!(matches!(err, IngestError::Conflict(_)), "got {err}");
}

#[tokio::test]
async fn invalid_feed_leaves_the_listing_untouched() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;

    let broken = "shop: Связной\ngoods: []\n";
    let err = PriceList::from_slice(broken.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("categories"));
    // Parsing failed before any database work, so the previous listing still stands.
    let entries = db.search_catalog(CatalogQueryFilter::default().with_shop_id(shop_id)).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn pausing_a_shop_hides_it_from_the_catalog() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;

    assert!(db.set_accepting_orders(SUPPLIER, false).await.unwrap());
    let entries = db.search_catalog(CatalogQueryFilter::default()).await.unwrap();
    assert!(entries.is_empty());
    assert!(db.fetch_shops().await.unwrap().is_empty());
    // The stock records themselves are still there.
    let shop = db.fetch_shop_for_user(SUPPLIER).await.unwrap().unwrap();
    assert_eq!(shop.id, shop_id);
    assert!(!shop.accepting_orders);

    assert!(db.set_accepting_orders(SUPPLIER, true).await.unwrap());
    let entries = db.search_catalog(CatalogQueryFilter::default()).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn toggling_without_a_shop_reports_false() {
    let db = new_test_db().await;
    assert!(!db.set_accepting_orders(999, true).await.unwrap());
}

#[tokio::test]
async fn feed_origin_is_recorded_on_the_shop() {
    let db = new_test_db().await;
    ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let shop = db.fetch_shop_for_user(SUPPLIER).await.unwrap().unwrap();
    assert_eq!(shop.url.as_deref(), Some("https://example.com/100/pricelist.yaml"));
    assert!(shop.filename.is_none());
}
