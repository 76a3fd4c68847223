use serde::{Deserialize, Serialize};
use storefront_engine::{
    db_types::{Coupon, DiscountRate, Order},
    order_objects::SubmittedOrder,
};

/// The public face of a coupon: just what a customer needs to use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponOffer {
    pub code: String,
    pub discount: DiscountRate,
}

impl From<Coupon> for CouponOffer {
    fn from(coupon: Coupon) -> Self {
        Self { code: coupon.code, discount: coupon.discount }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponResponse {
    pub message: String,
    pub coupon: Option<CouponOffer>,
}

impl CouponResponse {
    pub fn new<S: Into<String>>(message: S, coupon: Option<Coupon>) -> Self {
        Self { message: message.into(), coupon: coupon.map(CouponOffer::from) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub message: String,
    pub order: Order,
    pub coupon_available: Option<CouponOffer>,
}

impl From<SubmittedOrder> for OrderCreatedResponse {
    fn from(submitted: SubmittedOrder) -> Self {
        Self {
            message: "Order created successfully".to_string(),
            order: submitted.order,
            coupon_available: submitted.coupon_offer.map(CouponOffer::from),
        }
    }
}
