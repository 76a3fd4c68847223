use actix_web::{http::StatusCode, web, web::ServiceConfig};
use storefront_engine::{events::EventProducers, helpers::RetryConfig, traits::StoreError, CouponApi};

use super::{
    helpers::{coupon, get_request},
    mocks::MockStore,
};
use crate::routes::AvailableCouponRoute;

fn configure_with(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = CouponApi::new(store, EventProducers::default()).with_retry_config(RetryConfig::no_retries());
        cfg.service(AvailableCouponRoute::<MockStore>::new()).app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn fetch_available_coupon() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().times(1).returning(|| Ok(Some(coupon("AB3CD", false))));
    let (status, body) = get_request("/coupons", configure_with(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Unused coupon found","coupon":{"code":"AB3CD","discount":0.1}}"#);
}

#[actix_web::test]
async fn no_coupon_available() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_available_coupon().returning(|| Ok(None));
    // Looking never mints
    store.expect_insert_coupon_if_none_available().never();
    let (status, body) = get_request("/coupons", configure_with(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"No unused coupon available","coupon":null}"#);
}

#[actix_web::test]
async fn storage_failure_is_opaque() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store
        .expect_fetch_available_coupon()
        .returning(|| Err(StoreError::DatabaseError("unable to open database file: /srv/data/storefront.db".into())));
    let (status, body) = get_request("/coupons", configure_with(store)).await.expect("Request failed");
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, r#"{"error":"The service is temporarily unavailable. Please try again."}"#);
}
