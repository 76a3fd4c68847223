use chrono::{DateTime, Utc};

use crate::{
    db_types::{NewOrder, Order, OrderId},
    order_objects::OrderQueryFilter,
    traits::StoreError,
};

/// The append-only order ledger.
#[allow(async_fn_in_trait)]
pub trait OrderLedger {
    /// Persists a fully-formed order. The order is durable by the time this call returns.
    ///
    /// Returns the stored order, including the `OrderId` the ledger assigned to it.
    async fn append_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Counts the orders created strictly after `since`, or every order if `since` is `None`.
    async fn count_orders(&self, since: Option<DateTime<Utc>>) -> Result<u64, StoreError>;

    /// Fetches the most recent order matching the filter, if there is one.
    async fn latest_order_where(&self, filter: OrderQueryFilter) -> Result<Option<Order>, StoreError>;

    /// Lists every order in the ledger, most recent first.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
}
