use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use storefront_engine::{traits::StoreError, CouponApiError, OrderIntakeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Storage is unavailable. {0}")]
    StorageError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// Whether the error message is safe to show to API clients.
    fn is_public(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequestBody(_)
                | Self::InvalidRequestPath(_)
                | Self::ValidationError(_)
                | Self::NoRecordFound(_)
                | Self::Conflict(_)
        )
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::StorageError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_public() {
            self.to_string()
        } else {
            error!("💻️ Request failed. {self}");
            match self {
                Self::StorageError(_) => "The service is temporarily unavailable. Please try again.".to_string(),
                _ => "An internal error occurred.".to_string(),
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DatabaseError(s) => Self::StorageError(s),
            StoreError::CouponNotFound(_) => Self::NoRecordFound(e.to_string()),
            StoreError::CouponAlreadyUsed(_) => Self::Conflict(e.to_string()),
            StoreError::InternalError(s) => Self::Unspecified(s),
        }
    }
}

impl From<CouponApiError> for ServerError {
    fn from(e: CouponApiError) -> Self {
        match e {
            CouponApiError::StorageError(s) => Self::StorageError(s),
            CouponApiError::CouponNotFound(_) => Self::NoRecordFound(e.to_string()),
            CouponApiError::CouponAlreadyUsed(_) => Self::Conflict(e.to_string()),
            CouponApiError::CodesExhausted(_) | CouponApiError::InternalError(_) => Self::Unspecified(e.to_string()),
        }
    }
}

impl From<OrderIntakeError> for ServerError {
    fn from(e: OrderIntakeError) -> Self {
        match e {
            OrderIntakeError::InvalidOrder { .. } => Self::ValidationError(e.to_string()),
            OrderIntakeError::StaleDiscount(_) => Self::Conflict(e.to_string()),
            OrderIntakeError::StorageError(s) => Self::StorageError(s),
            OrderIntakeError::InternalError(s) => Self::Unspecified(s),
        }
    }
}
