use chrono::{DateTime, Utc};
use mockall::mock;
use storefront_engine::{
    db_types::{Coupon, MintOutcome, NewCoupon, NewOrder, Order, OrderId},
    order_objects::OrderQueryFilter,
    traits::{CouponStore, OrderLedger, StoreError, StorefrontDatabase},
};

mock! {
    pub Ledger {}
    impl OrderLedger for Ledger {
        async fn append_order(&self, order: NewOrder) -> Result<Order, StoreError>;
        async fn count_orders(&self, since: Option<DateTime<Utc>>) -> Result<u64, StoreError>;
        async fn latest_order_where(&self, filter: OrderQueryFilter) -> Result<Option<Order>, StoreError>;
        async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
        async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    }
}

mock! {
    pub Store {}
    impl Clone for Store {
        fn clone(&self) -> Self;
    }
    impl OrderLedger for Store {
        async fn append_order(&self, order: NewOrder) -> Result<Order, StoreError>;
        async fn count_orders(&self, since: Option<DateTime<Utc>>) -> Result<u64, StoreError>;
        async fn latest_order_where(&self, filter: OrderQueryFilter) -> Result<Option<Order>, StoreError>;
        async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
        async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    }
    impl CouponStore for Store {
        async fn fetch_available_coupon(&self) -> Result<Option<Coupon>, StoreError>;
        async fn fetch_coupon(&self, code: &str) -> Result<Option<Coupon>, StoreError>;
        async fn fetch_last_redeemed_coupon(&self) -> Result<Option<Coupon>, StoreError>;
        async fn insert_coupon_if_none_available(&self, coupon: NewCoupon) -> Result<MintOutcome, StoreError>;
        async fn redeem_coupon(&self, code: &str) -> Result<Coupon, StoreError>;
    }
    impl StorefrontDatabase for Store {
        fn url(&self) -> &str;
        async fn close(&mut self) -> Result<(), StoreError>;
    }
}
