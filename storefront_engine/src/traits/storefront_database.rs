use thiserror::Error;

use crate::traits::{CouponStore, OrderLedger};

/// The highest level of behaviour for backends supporting the storefront engine.
#[allow(async_fn_in_trait)]
pub trait StorefrontDatabase: Clone + OrderLedger + CouponStore {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Releases any resources held by the backend. The default does nothing.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend could not be reached or is busy. Operations failing with this error may be retried.
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Coupon {0} does not exist")]
    CouponNotFound(String),
    #[error("Coupon {0} has already been used")]
    CouponAlreadyUsed(String),
    #[error("Internal storage error: {0}")]
    InternalError(String),
}

impl StoreError {
    /// Whether the failure is likely to go away if the operation is tried again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DatabaseError(_))
    }
}

// SQLite primary result codes for a locked database
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed => {
                Self::DatabaseError(e.to_string())
            },
            sqlx::Error::Database(db_err) => {
                let primary_code = db_err.code().and_then(|c| c.parse::<i64>().ok()).map(|c| c & 0xff);
                match primary_code {
                    Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => Self::DatabaseError(e.to_string()),
                    _ => Self::InternalError(e.to_string()),
                }
            },
            _ => Self::InternalError(e.to_string()),
        }
    }
}
