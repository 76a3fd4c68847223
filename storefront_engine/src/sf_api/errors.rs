use thiserror::Error;

use crate::traits::StoreError;

#[derive(Debug, Clone, Error)]
pub enum CouponApiError {
    #[error("Storage is unavailable: {0}")]
    StorageError(String),
    #[error("Coupon {0} does not exist")]
    CouponNotFound(String),
    #[error("Coupon {0} has already been used")]
    CouponAlreadyUsed(String),
    #[error("Could not find an unused coupon code after {0} attempts")]
    CodesExhausted(u32),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for CouponApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DatabaseError(s) => Self::StorageError(s),
            StoreError::CouponNotFound(code) => Self::CouponNotFound(code),
            StoreError::CouponAlreadyUsed(code) => Self::CouponAlreadyUsed(code),
            StoreError::InternalError(s) => Self::InternalError(s),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderIntakeError {
    #[error("Invalid order. {field}: {reason}")]
    InvalidOrder { field: String, reason: String },
    #[error("The discount code {0} is not valid or has already been used")]
    StaleDiscount(String),
    #[error("Storage is unavailable: {0}")]
    StorageError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl OrderIntakeError {
    pub fn invalid<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::InvalidOrder { field: field.into(), reason: reason.into() }
    }
}

impl From<StoreError> for OrderIntakeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DatabaseError(s) => Self::StorageError(s),
            e => Self::InternalError(e.to_string()),
        }
    }
}

impl From<CouponApiError> for OrderIntakeError {
    fn from(e: CouponApiError) -> Self {
        match e {
            CouponApiError::StorageError(s) => Self::StorageError(s),
            e => Self::InternalError(e.to_string()),
        }
    }
}
