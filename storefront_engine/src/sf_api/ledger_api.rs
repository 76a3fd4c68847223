//! Read access to the order ledger, for listing orders and for the admin view.
use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::{Order, OrderId},
    helpers::{retry_storage, RetryConfig},
    sf_api::stats::{summarize, Stats},
    traits::{OrderLedger, StoreError},
};

pub struct LedgerApi<B> {
    db: B,
    retry: RetryConfig,
}

impl<B: Debug> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?})", self.db)
    }
}

impl<B> LedgerApi<B>
where B: OrderLedger
{
    pub fn new(db: B) -> Self {
        Self { db, retry: RetryConfig::default() }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Every order, most recent first.
    pub async fn orders(&self) -> Result<Vec<Order>, StoreError> {
        let db = &self.db;
        retry_storage(&self.retry, "list_orders", move || db.list_orders()).await
    }

    pub async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let db = &self.db;
        retry_storage(&self.retry, "fetch_order", move || db.fetch_order(id)).await
    }

    /// Sales and discount totals over the whole ledger.
    pub async fn stats(&self) -> Result<Stats, StoreError> {
        let orders = self.orders().await?;
        trace!("📊️ Summarizing {} orders", orders.len());
        Ok(summarize(&orders))
    }
}
