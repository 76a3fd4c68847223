use std::sync::{Arc, Mutex};

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use serde_json::{json, Value};
use storefront_engine::{
    db_types::{DiscountRate, LineItem, MintOutcome, Money, Order, OrderId},
    events::EventProducers,
    helpers::RetryConfig,
    CouponApi,
    CouponApiError,
    CouponPolicy,
    LedgerApi,
    OrderIntakeApi,
};

use super::{
    helpers::{coupon, get_request},
    mocks::{MockLedger, MockStore},
};
use crate::routes::{AdminDiagnosticsRoute, AdminDiscountRoute, AdminStatsRoute};

#[actix_web::test]
async fn discount_returns_existing_coupon() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().returning(|| Ok(Some(coupon("AB3CD", false))));
    store.expect_insert_coupon_if_none_available().never();
    let (status, body) = get_request("/admin/discount", configure_discount(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Coupon fetched successfully","coupon":{"code":"AB3CD","discount":0.1}}"#);
}

#[actix_web::test]
async fn discount_not_yet_eligible() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().returning(|| Ok(None));
    store.expect_fetch_last_redeemed_coupon().returning(|| Ok(Some(coupon("OLD22", true))));
    store.expect_count_orders().returning(|_| Ok(2));
    store.expect_insert_coupon_if_none_available().never();
    let (status, body) = get_request("/admin/discount", configure_discount(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"message":"Condition not satisfied. At least 3 orders are required since the last discount code was used.","coupon":null}"#
    );
}

#[actix_web::test]
async fn discount_is_minted_at_threshold() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().returning(|| Ok(None));
    store.expect_fetch_last_redeemed_coupon().returning(|| Ok(None));
    store.expect_count_orders().withf(|since| since.is_none()).returning(|_| Ok(3));
    store.expect_insert_coupon_if_none_available().times(1).returning(|new_coupon| {
        assert_eq!(new_coupon.code.len(), 5);
        assert_eq!(new_coupon.discount.value(), 0.1);
        Ok(MintOutcome::Created(coupon("NEW55", false)))
    });
    let (status, body) = get_request("/admin/discount", configure_discount(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Coupon generated successfully","coupon":{"code":"NEW55","discount":0.1}}"#);
}

#[actix_web::test]
async fn concurrent_mint_returns_the_winner() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().returning(|| Ok(None));
    store.expect_fetch_last_redeemed_coupon().returning(|| Ok(None));
    store.expect_count_orders().returning(|_| Ok(4));
    store
        .expect_insert_coupon_if_none_available()
        .returning(|_| Ok(MintOutcome::AlreadyAvailable(coupon("WIN77", false))));
    let (status, body) = get_request("/admin/discount", configure_discount(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Coupon fetched successfully","coupon":{"code":"WIN77","discount":0.1}}"#);
}

#[actix_web::test]
async fn taken_code_is_retried_with_a_fresh_one() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().returning(|| Ok(None));
    store.expect_fetch_last_redeemed_coupon().returning(|| Ok(None));
    store.expect_count_orders().returning(|_| Ok(3));
    let attempts = Arc::new(Mutex::new(Vec::<String>::new()));
    let seen = Arc::clone(&attempts);
    store.expect_insert_coupon_if_none_available().times(2).returning(move |new_coupon| {
        let mut seen = seen.lock().unwrap();
        seen.push(new_coupon.code.clone());
        if seen.len() == 1 {
            Ok(MintOutcome::CodeTaken(new_coupon.code))
        } else {
            Ok(MintOutcome::Created(coupon(&new_coupon.code, false)))
        }
    });
    let (status, body) = get_request("/admin/discount", configure_discount(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Coupon generated successfully");
    let attempts = attempts.lock().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(json["coupon"]["code"], attempts[1].as_str());
}

#[actix_web::test]
async fn minting_gives_up_after_repeated_code_collisions() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().returning(|| Ok(None));
    store.expect_fetch_last_redeemed_coupon().returning(|| Ok(None));
    store.expect_count_orders().returning(|_| Ok(3));
    store
        .expect_insert_coupon_if_none_available()
        .times(5)
        .returning(|new_coupon| Ok(MintOutcome::CodeTaken(new_coupon.code)));
    let (status, body) = get_request("/admin/discount", configure_discount(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"An internal error occurred."}"#);

    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().returning(|| Ok(None));
    store.expect_fetch_last_redeemed_coupon().returning(|| Ok(None));
    store.expect_count_orders().returning(|_| Ok(3));
    store
        .expect_insert_coupon_if_none_available()
        .times(2)
        .returning(|new_coupon| Ok(MintOutcome::CodeTaken(new_coupon.code)));
    let policy = CouponPolicy { max_code_attempts: 2, ..CouponPolicy::default() };
    let api = CouponApi::new(store, EventProducers::default())
        .with_policy(policy)
        .with_retry_config(RetryConfig::no_retries());
    let result = api.check_and_mint().await;
    assert!(matches!(result, Err(CouponApiError::CodesExhausted(2))), "{result:?}");
}

#[actix_web::test]
async fn admin_stats() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/admin", configure_stats).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let stats: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["totalPurchaseAmount"], 150.0);
    assert_eq!(stats["totalDiscountAmount"], 20.0);
    assert_eq!(stats["discountCodesUsed"], json!(["DISCOUNT10"]));
    assert_eq!(
        stats["itemSales"],
        json!([{"id": "item1", "title": "Product 1", "count": 3}, {"id": "item2", "title": "Product 2", "count": 1}])
    );
}

#[actix_web::test]
async fn admin_diagnostics_start_empty() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let api = OrderIntakeApi::new(MockStore::new(), EventProducers::default());
        cfg.service(AdminDiagnosticsRoute::<MockStore>::new()).app_data(web::Data::new(api));
    };
    let (status, body) = get_request("/admin/diagnostics", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ordersAccepted":0,"redemptionConflicts":0,"mintFailures":0}"#);
}

fn configure_discount(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = CouponApi::new(store, EventProducers::default()).with_retry_config(RetryConfig::no_retries());
        cfg.service(AdminDiscountRoute::<MockStore>::new()).app_data(web::Data::new(api));
    }
}

fn configure_stats(cfg: &mut ServiceConfig) {
    let mut ledger = MockLedger::new();
    ledger.expect_list_orders().returning(|| Ok(stats_fixture()));
    let api = LedgerApi::new(ledger);
    cfg.service(AdminStatsRoute::<MockLedger>::new()).app_data(web::Data::new(api));
}

fn order(id: i64, items: Vec<LineItem>, subtotal: f64, rate: f64, total: f64, code: Option<&str>) -> Order {
    Order {
        id: OrderId(id),
        items,
        subtotal: Money::from(subtotal),
        discount_applied: DiscountRate::new(rate).unwrap(),
        total_price: Money::from(total),
        name: "Alice".into(),
        address: "1 Main St".into(),
        coupon_used: code.map(String::from),
        used_coupon: code.is_some(),
        created_at: Utc::now(),
    }
}

fn stats_fixture() -> Vec<Order> {
    let first = vec![
        LineItem::new("item1", "Product 1", Money::from(50.0), 2),
        LineItem::new("item2", "Product 2", Money::from(20.0), 1),
    ];
    vec![
        order(2, first, 120.0, 0.1, 100.0, Some("DISCOUNT10")),
        order(1, vec![LineItem::new("item1", "Product 1", Money::from(50.0), 1)], 50.0, 0.0, 50.0, None),
    ]
}
