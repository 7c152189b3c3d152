//! Shared setup for the integration tests: a fresh throwaway SQLite database per test, plus a canned supplier
//! feed to populate it with.
#![allow(dead_code)]
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};
use supply_engine::{
    db_types::{Contact, NewContact},
    feed::{FeedSource, PriceList},
    traits::{CatalogEntry, CatalogQueryFilter},
    CatalogManagement,
    SqliteDatabase,
    SupplyGatewayDatabase,
};

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("sg_test_store_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn prepare_test_env(url: &str) {
    dotenvy::dotenv().ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database")
}

/// The feed id of the phone listed with quantity 5 in [`sample_feed`].
pub const PHONE_ID: i64 = 4216292;
/// The feed id of the cable listed with quantity 100 in [`sample_feed`].
pub const CABLE_ID: i64 = 4216313;

pub fn sample_feed(shop: &str) -> PriceList {
    let yaml = format!(
        r#"
shop: {shop}
categories:
  - id: 224
    name: Смартфоны
  - id: 15
    name: Аксессуары
goods:
  - id: {PHONE_ID}
    category: 224
    model: apple/iphone/xs-max
    name: Смартфон Apple iPhone XS Max 512GB (золотистый)
    price: 110000
    price_rrc: 116990
    quantity: 5
    parameters:
      "Диагональ (дюйм)": 6.5
      "Цвет": золотистый
  - id: {CABLE_ID}
    category: 15
    name: Кабель USB Type-C
    model: hama/usb-c
    price: 990
    price_rrc: 1190
    quantity: 100
"#
    );
    let list = PriceList::from_slice(yaml.as_bytes()).expect("sample feed must parse");
    list.validate().expect("sample feed must validate");
    list
}

/// Ingests [`sample_feed`] for the given supplier and returns the shop id.
pub async fn ingest_sample_feed(db: &SqliteDatabase, user_id: i64, shop: &str) -> i64 {
    let list = sample_feed(shop);
    let origin = FeedSource::url(format!("https://example.com/{user_id}/pricelist.yaml"));
    let summary = db.replace_price_list(user_id, &origin, &list).await.expect("feed ingestion failed");
    summary.shop_id
}

/// Finds the stock record for a feed product id within one shop.
pub async fn stock_entry(db: &SqliteDatabase, shop_id: i64, product_id: i64) -> CatalogEntry {
    let filter = CatalogQueryFilter::default().with_shop_id(shop_id).with_product_id(product_id);
    let mut entries = db.search_catalog(filter).await.expect("catalog search failed");
    assert_eq!(entries.len(), 1, "expected exactly one stock record for product {product_id} in shop {shop_id}");
    entries.remove(0)
}

pub async fn quantity_of(db: &SqliteDatabase, product_info_id: i64) -> i64 {
    db.fetch_product_info(product_info_id)
        .await
        .expect("product info fetch failed")
        .map(|pi| pi.quantity)
        .unwrap_or_default()
}

pub async fn contact_for(db: &SqliteDatabase, user_id: i64) -> Contact {
    let contact = NewContact::new(user_id, "Москва", "Тверская, 1", "+7 999 000-00-00");
    db.insert_contact(contact).await.expect("contact insert failed")
}
