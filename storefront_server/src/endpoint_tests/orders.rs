use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use storefront_engine::{
    db_types::{DiscountRate, LineItem, Money, NewOrder, Order, OrderId},
    events::EventProducers,
    helpers::RetryConfig,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    LedgerApi,
    OrderIntakeApi,
    SqliteDatabase,
};

use super::{
    helpers::{get_request, post_request, stored},
    mocks::{MockLedger, MockStore},
};
use crate::routes::{OrderByIdRoute, OrdersRoute, SubmitOrderRoute};

const ORDER_BODY: &str = r#"{"items":[{"id":"item1","title":"Product 1","price":30.0,"quantity":2}],"subtotal":60.0,"discountApplied":0,"totalPrice":60.0,"name":"Alice","address":"1 Main St"}"#;

#[actix_web::test]
async fn fetch_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders", configure_ledger).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders, orders_response());
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["id"], 2);
    assert_eq!(json[0]["couponUsed"], "DISCOUNT10");
    assert_eq!(json[0]["discountApplied"], 0.2);
    assert_eq!(json[1]["createdAt"], "2024-03-15T18:30:00Z");
}

#[actix_web::test]
async fn fetch_order_by_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/1", configure_ledger).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.id, OrderId(1));
}

#[actix_web::test]
async fn fetch_missing_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/7", configure_ledger).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order #7"}"#);
}

#[actix_web::test]
async fn fetch_order_with_bad_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/first", configure_ledger).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request path"#), "{body}");
}

#[actix_web::test]
async fn submit_order_without_items() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_append_order().never();
    let body = r#"{"items":[],"name":"Alice","address":"1 Main St"}"#;
    let (status, body) = post_request("/orders", body, configure_intake(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Invalid order. items: An order must contain at least one item"}"#);
}

#[actix_web::test]
async fn submit_malformed_order() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_append_order().never();
    let (status, body) =
        post_request("/orders", r#"{"items": "lots"}"#, configure_intake(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request body"#), "{body}");
}

#[actix_web::test]
async fn submit_order_with_stale_coupon() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_coupon().returning(|_| Ok(None));
    store.expect_append_order().never();
    let body = r#"{"items":[{"id":"item1","price":30.0,"quantity":1}],"name":"Alice","address":"1 Main St","couponUsed":"ZZZZZ"}"#;
    let (status, _) = post_request("/orders", body, configure_intake(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn client_prices_are_recomputed() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_append_order().times(1).returning(|order| Ok(stored(1, order)));
    store.expect_fetch_available_coupon().returning(|| Ok(None));
    store.expect_fetch_last_redeemed_coupon().returning(|| Ok(None));
    store.expect_count_orders().returning(|_| Ok(1));
    let body = ORDER_BODY.replace(r#""totalPrice":60.0"#, r#""totalPrice":1.0"#);
    let (status, body) = post_request("/orders", &body, configure_intake(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Order created successfully");
    assert_eq!(json["order"]["totalPrice"], 60.0);
    assert_eq!(json["order"]["subtotal"], 60.0);
    assert!(json["couponAvailable"].is_null());
}

#[actix_web::test]
async fn submitted_order_is_listed_unchanged() {
    let _ = env_logger::try_init().ok();
    let db = prepare_test_env(&random_db_path()).await;
    let (status, body) =
        post_request("/orders", ORDER_BODY, configure_sqlite(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    let submitted: Order = serde_json::from_value(json["order"].clone()).unwrap();
    assert_eq!(submitted.name, "Alice");
    assert_eq!(submitted.total_price, Money::from(60.0));

    let (status, body) = get_request("/orders", configure_sqlite(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders, vec![submitted]);
}

fn configure_ledger(cfg: &mut ServiceConfig) {
    let mut ledger = MockLedger::new();
    ledger.expect_list_orders().returning(|| Ok(orders_response()));
    ledger.expect_fetch_order().returning(|id| Ok(orders_response().into_iter().find(|o| o.id == id)));
    let api = LedgerApi::new(ledger).with_retry_config(RetryConfig::no_retries());
    cfg.service(OrdersRoute::<MockLedger>::new())
        .service(OrderByIdRoute::<MockLedger>::new())
        .app_data(web::Data::new(api));
}

fn configure_intake(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderIntakeApi::new(store, EventProducers::default()).with_retry_config(RetryConfig::no_retries());
        cfg.service(SubmitOrderRoute::<MockStore>::new()).app_data(web::Data::new(api));
    }
}

fn configure_sqlite(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let intake = OrderIntakeApi::new(db.clone(), EventProducers::default());
        let ledger = LedgerApi::new(db);
        cfg.service(SubmitOrderRoute::<SqliteDatabase>::new())
            .service(OrdersRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(intake))
            .app_data(web::Data::new(ledger));
    }
}

// Mock response to `list_orders`, most recent first
fn orders_response() -> Vec<Order> {
    let items = vec![
        LineItem::new("item1", "Product 1", Money::from(50.0), 1),
        LineItem::new("item2", "Product 2", Money::from(50.0), 1),
    ];
    let second = NewOrder::new(items, "Bob".into(), "2 High St".into())
        .with_coupon("DISCOUNT10".into(), DiscountRate::new(0.2).unwrap())
        .with_created_at(Utc.with_ymd_and_hms(2024, 3, 16, 11, 20, 0).unwrap());
    let items = vec![LineItem::new("item1", "Product 1", Money::from(35.0), 2)];
    let first = NewOrder::new(items, "Alice".into(), "1 Main St".into())
        .with_created_at(Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap());
    vec![stored(2, second), stored(1, first)]
}
