mod coupon_codes;
mod retry;

pub use coupon_codes::{generate_coupon_code, COUPON_CODE_ALPHABET};
pub use retry::{retry_storage, RetryConfig};
