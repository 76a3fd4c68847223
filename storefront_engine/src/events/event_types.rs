use serde::{Deserialize, Serialize};

use crate::db_types::{Coupon, Order, OrderId};

/// An order has been appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// A new coupon has become available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponMintedEvent {
    pub coupon: Coupon,
}

impl CouponMintedEvent {
    pub fn new(coupon: Coupon) -> Self {
        Self { coupon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponRedeemedEvent {
    pub coupon: Coupon,
    /// The order that used the coupon
    pub order_id: OrderId,
}

impl CouponRedeemedEvent {
    pub fn new(coupon: Coupon, order_id: OrderId) -> Self {
        Self { coupon, order_id }
    }
}

/// The storefront was eligible for a new coupon, but minting it failed. The order that triggered the attempt was still
/// accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintFailedEvent {
    pub reason: String,
    pub orders_since_last_redemption: u64,
}

