use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use log::debug;
use storefront_engine::db_types::{Coupon, DiscountRate, NewOrder, Order, OrderId};

use crate::server::configure_extractors;

pub async fn get_request<F>(path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    send(TestRequest::get().uri(path), configure).await
}

pub async fn post_request<F>(path: &str, body: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let req = TestRequest::post()
        .uri(path)
        .insert_header(("content-type", "application/json"))
        .set_payload(body.to_string());
    send(req, configure).await
}

async fn send<F>(req: TestRequest, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure_extractors).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub fn coupon(code: &str, used: bool) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount: DiscountRate::new(0.1).unwrap(),
        used,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        redeemed_at: None,
    }
}

/// The ledger record a store would return after appending `order`.
pub fn stored(id: i64, order: NewOrder) -> Order {
    Order {
        id: OrderId(id),
        items: order.items,
        subtotal: order.subtotal,
        discount_applied: order.discount_applied,
        total_price: order.total_price,
        name: order.name,
        address: order.address,
        used_coupon: order.coupon_used.is_some(),
        coupon_used: order.coupon_used,
        created_at: order.created_at,
    }
}
