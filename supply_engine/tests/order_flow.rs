//! The basket/order state machine against a real SQLite database: stock reservation, cancellation credits and
//! the conflict rules around baskets.
mod common;

use common::*;
use supply_engine::{
    db_types::{BasketItem, OrderState, QuantityUpdate},
    traits::OrderFlowError,
    SupplyGatewayDatabase,
};

const SUPPLIER: i64 = 100;
const BUYER: i64 = 1;
const OTHER_BUYER: i64 = 2;

#[tokio::test]
async fn placing_an_order_reserves_stock() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    let contact = contact_for(&db, BUYER).await;

    let added = db
        .add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 3 }])
        .await
        .unwrap();
    assert_eq!(added, 1);
    // The basket is a request, not a debit.
    assert_eq!(quantity_of(&db, phone.id).await, 5);

    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();
    assert_eq!(basket.order.state, OrderState::Basket);
    assert_eq!(basket.order.total.value(), 330_000);
    assert_eq!(basket.items.len(), 1);

    let order = db.place_order(BUYER, basket.order.id, contact.id).await.unwrap();
    assert_eq!(order.state, OrderState::New);
    assert_eq!(order.contact_id, Some(contact.id));
    assert_eq!(quantity_of(&db, phone.id).await, 2);
    // The basket slot is free again.
    assert!(db.fetch_basket(BUYER).await.unwrap().is_none());
}

#[tokio::test]
async fn insufficient_stock_aborts_the_whole_placement() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    let cable = stock_entry(&db, shop_id, CABLE_ID).await;
    let contact = contact_for(&db, BUYER).await;

    db.add_basket_items(BUYER, &[
        BasketItem { product_info: cable.id, quantity: 10 },
        BasketItem { product_info: phone.id, quantity: 6 },
    ])
    .await
    .unwrap();
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();

    let err = db.place_order(BUYER, basket.order.id, contact.id).await.unwrap_err();
    match err {
        OrderFlowError::InsufficientStock { product_info_id, requested, available } => {
            assert_eq!(product_info_id, phone.id);
            assert_eq!(requested, 6);
            assert_eq!(available, 5);
        },
        other => panic!("expected InsufficientStock, got {other}"),
    }
    // Nothing was debited, not even the cable line that would have succeeded.
    assert_eq!(quantity_of(&db, phone.id).await, 5);
    assert_eq!(quantity_of(&db, cable.id).await, 100);
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();
    assert_eq!(basket.order.state, OrderState::Basket);
    assert_eq!(basket.items.len(), 2);
}

#[tokio::test]
async fn cancellation_credits_stock_back() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    let contact = contact_for(&db, BUYER).await;

    db.add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 3 }]).await.unwrap();
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();
    let order = db.place_order(BUYER, basket.order.id, contact.id).await.unwrap();
    assert_eq!(quantity_of(&db, phone.id).await, 2);

    let canceled = db.cancel_order(BUYER, order.id).await.unwrap();
    assert_eq!(canceled, Some(order.id));
    assert_eq!(quantity_of(&db, phone.id).await, 5);
    assert!(db.fetch_orders_for_user(BUYER).await.unwrap().is_empty());

    // A second cancel is a no-op, and the credit is not applied twice.
    assert_eq!(db.cancel_order(BUYER, order.id).await.unwrap(), None);
    assert_eq!(quantity_of(&db, phone.id).await, 5);
}

#[tokio::test]
async fn concurrent_placements_cannot_oversell() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    let contact_1 = contact_for(&db, BUYER).await;
    let contact_2 = contact_for(&db, OTHER_BUYER).await;

    db.add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 3 }]).await.unwrap();
    db.add_basket_items(OTHER_BUYER, &[BasketItem { product_info: phone.id, quantity: 3 }]).await.unwrap();
    let basket_1 = db.fetch_basket(BUYER).await.unwrap().unwrap();
    let basket_2 = db.fetch_basket(OTHER_BUYER).await.unwrap().unwrap();

    let db_1 = db.clone();
    let db_2 = db.clone();
    let (res_1, res_2) = tokio::join!(
        db_1.place_order(BUYER, basket_1.order.id, contact_1.id),
        db_2.place_order(OTHER_BUYER, basket_2.order.id, contact_2.id),
    );

    // Five phones cannot cover two orders of three; exactly one placement wins.
    let successes = [&res_1, &res_2].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of the racing placements must win: {res_1:?} / {res_2:?}");
    let loser = if res_1.is_ok() { res_2 } else { res_1 };
    assert!(
        matches!(loser, Err(OrderFlowError::InsufficientStock { .. })),
        "the losing placement must see insufficient stock"
    );
    assert_eq!(quantity_of(&db, phone.id).await, 2);
}

#[tokio::test]
async fn duplicate_basket_lines_are_rejected() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;

    db.add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 1 }]).await.unwrap();
    let err = db
        .add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 2 }])
        .await
        .unwrap_err();
    assert!(matches!(err, OrderFlowError::DuplicateItem(id) if id == phone.id), "got {err}");
    // The rejected call changed nothing.
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();
    assert_eq!(basket.items.len(), 1);
    assert_eq!(basket.items[0].quantity, 1);
}

#[tokio::test]
async fn basket_lines_can_be_updated_and_removed() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    let cable = stock_entry(&db, shop_id, CABLE_ID).await;

    db.add_basket_items(BUYER, &[
        BasketItem { product_info: phone.id, quantity: 1 },
        BasketItem { product_info: cable.id, quantity: 2 },
    ])
    .await
    .unwrap();
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();
    let phone_line = basket.items.iter().find(|i| i.product_info_id == phone.id).unwrap();

    let updated = db
        .update_basket_items(BUYER, &[
            QuantityUpdate { id: phone_line.id, quantity: 4 },
            QuantityUpdate { id: 99_999, quantity: 1 },
        ])
        .await
        .unwrap();
    assert_eq!(updated, 1, "unknown line ids are skipped");
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();
    let phone_line = basket.items.iter().find(|i| i.product_info_id == phone.id).unwrap();
    assert_eq!(phone_line.quantity, 4);

    let item_ids = basket.items.iter().map(|i| i.id).collect::<Vec<_>>();
    let removal = db.remove_basket_items(BUYER, &item_ids).await.unwrap();
    assert_eq!(removal.removed, 2);
    assert!(removal.basket_deleted);
    assert!(db.fetch_basket(BUYER).await.unwrap().is_none());
}

#[tokio::test]
async fn adding_nothing_creates_no_basket() {
    let db = new_test_db().await;
    ingest_sample_feed(&db, SUPPLIER, "Связной").await;

    assert_eq!(db.add_basket_items(BUYER, &[]).await.unwrap(), 0);
    assert!(db.fetch_basket(BUYER).await.unwrap().is_none(), "an empty add request must not leave an order row");
    // A lingering empty order row would be found and reaped here.
    assert!(!db.remove_basket_items(BUYER, &[]).await.unwrap().basket_deleted);
}

#[tokio::test]
async fn baskets_are_private_to_their_owner() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    let contact = contact_for(&db, BUYER).await;

    db.add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 1 }]).await.unwrap();
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();

    // Another user can neither see nor place this basket.
    assert!(db.fetch_basket(OTHER_BUYER).await.unwrap().is_none());
    let err = db.place_order(OTHER_BUYER, basket.order.id, contact.id).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::OrderNotFound(_)), "got {err}");
}

#[tokio::test]
async fn placing_with_someone_elses_contact_fails() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    let foreign_contact = contact_for(&db, OTHER_BUYER).await;

    db.add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 1 }]).await.unwrap();
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();

    let err = db.place_order(BUYER, basket.order.id, foreign_contact.id).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidContact(id) if id == foreign_contact.id), "got {err}");
    assert_eq!(quantity_of(&db, phone.id).await, 5);
}

#[tokio::test]
async fn canceling_an_unplaced_basket_is_a_noop() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;

    db.add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 1 }]).await.unwrap();
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();
    assert_eq!(db.cancel_order(BUYER, basket.order.id).await.unwrap(), None);
    // The basket survives.
    assert!(db.fetch_basket(BUYER).await.unwrap().is_some());
}

#[tokio::test]
async fn order_listings_for_buyers_and_suppliers() {
    let db = new_test_db().await;
    let shop_id = ingest_sample_feed(&db, SUPPLIER, "Связной").await;
    let other_supplier = 300;
    ingest_sample_feed(&db, other_supplier, "Ситилинк").await;
    let phone = stock_entry(&db, shop_id, PHONE_ID).await;
    let contact = contact_for(&db, BUYER).await;

    db.add_basket_items(BUYER, &[BasketItem { product_info: phone.id, quantity: 2 }]).await.unwrap();
    let basket = db.fetch_basket(BUYER).await.unwrap().unwrap();
    let order = db.place_order(BUYER, basket.order.id, contact.id).await.unwrap();

    let mine = db.fetch_orders_for_user(BUYER).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, order.id);
    assert_eq!(mine[0].state, OrderState::New);
    assert_eq!(mine[0].total.value(), 220_000);

    // The order touches the first supplier's stock only.
    let theirs = db.fetch_orders_for_supplier(SUPPLIER).await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].id, order.id);
    assert!(db.fetch_orders_for_supplier(other_supplier).await.unwrap().is_empty());
    // Open baskets never show up in listings.
    assert!(db.fetch_orders_for_user(OTHER_BUYER).await.unwrap().is_empty());
}
