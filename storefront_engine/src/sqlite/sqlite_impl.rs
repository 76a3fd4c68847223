//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{coupons, db_url, new_pool, orders};
use crate::{
    db_types::{Coupon, MintOutcome, NewCoupon, NewOrder, Order, OrderId},
    order_objects::OrderQueryFilter,
    traits::{CouponStore, OrderLedger, StoreError, StorefrontDatabase},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        info!("🗃️ Database connection pool closed");
        Ok(())
    }
}

impl OrderLedger for SqliteDatabase {
    async fn append_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        Ok(order)
    }

    async fn count_orders(&self, since: Option<DateTime<Utc>>) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let count = orders::count_orders(since, &mut conn).await?;
        Ok(count)
    }

    async fn latest_order_where(&self, filter: OrderQueryFilter) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::latest_order_where(filter, &mut conn).await?;
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_all_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }
}

impl CouponStore for SqliteDatabase {
    async fn fetch_available_coupon(&self) -> Result<Option<Coupon>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let coupon = coupons::fetch_available_coupon(&mut conn).await?;
        Ok(coupon)
    }

    async fn fetch_coupon(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let coupon = coupons::fetch_coupon(code, &mut conn).await?;
        Ok(coupon)
    }

    async fn fetch_last_redeemed_coupon(&self) -> Result<Option<Coupon>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let coupon = coupons::fetch_last_redeemed_coupon(&mut conn).await?;
        Ok(coupon)
    }

    /// The insert is the first statement in the transaction, so the write lock is taken up front and the follow-up
    /// read sees the state that caused the conflict.
    async fn insert_coupon_if_none_available(&self, coupon: NewCoupon) -> Result<MintOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;
        let code = coupon.code.clone();
        let outcome = match coupons::insert_coupon_if_absent(coupon, &mut tx).await? {
            Some(created) => MintOutcome::Created(created),
            None => match coupons::fetch_available_coupon(&mut tx).await? {
                Some(existing) => {
                    debug!("🗃️ Coupon {existing} is already available. {code} was not minted.");
                    MintOutcome::AlreadyAvailable(existing)
                },
                None => {
                    debug!("🗃️ Coupon code {code} already belongs to a redeemed coupon");
                    MintOutcome::CodeTaken(code)
                },
            },
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn redeem_coupon(&self, code: &str) -> Result<Coupon, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = match coupons::redeem_coupon(code, Utc::now(), &mut tx).await? {
            Some(coupon) => {
                debug!("🗃️ Coupon {coupon} redeemed");
                Ok(coupon)
            },
            None => match coupons::fetch_coupon(code, &mut tx).await? {
                Some(_) => Err(StoreError::CouponAlreadyUsed(code.to_string())),
                None => Err(StoreError::CouponNotFound(code.to_string())),
            },
        };
        tx.commit().await?;
        result
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `SF_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        SqliteDatabase::open(url, max_connections, true).await
    }

    /// Opens the database at `url`. Set `use_wal` to `false` to keep SQLite's rollback journal instead of WAL mode.
    pub async fn open(url: &str, max_connections: u32, use_wal: bool) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections, use_wal).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
