//! Server configuration
//!
//! All configuration is read from environment variables (a `.env` file is loaded first, if present). Invalid values
//! are logged and replaced by their defaults, so the server always starts.
//!
//! | Variable                  | Default                       |
//! |---------------------------|-------------------------------|
//! | `SF_HOST`                 | `127.0.0.1`                   |
//! | `SF_PORT`                 | `8360`                        |
//! | `SF_DATABASE_URL`         | `sqlite://data/storefront.db` |
//! | `SF_DB_MAX_CONNECTIONS`   | `25`                          |
//! | `SF_USE_WAL`              | `true`                        |
//! | `SF_COUPON_THRESHOLD`     | `3`                           |
//! | `SF_COUPON_DISCOUNT`      | `0.1`                         |
//! | `SF_COUPON_CODE_LENGTH`   | `5`                           |
//! | `SF_STALE_COUPON_POLICY`  | `reject`                      |
//! | `SF_REDEMPTION_ANCHOR`    | `coupon_created`              |
//! | `SF_STORAGE_RETRIES`      | `3`                           |
use std::{env, fmt::Display, str::FromStr};

use log::*;
use storefront_common::helpers::{parse_boolean_flag, parse_or_default};
use storefront_engine::{
    db_types::DiscountRate,
    db_url,
    helpers::RetryConfig,
    CouponPolicy,
    RedemptionAnchor,
    StaleCouponPolicy,
};

const DEFAULT_SF_HOST: &str = "127.0.0.1";
const DEFAULT_SF_PORT: u16 = 8360;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const MIN_CODE_LENGTH: usize = 4;
const MAX_CODE_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Run SQLite in write-ahead-log mode, which lets readers proceed while an order is being written
    pub use_wal: bool,
    pub coupon_policy: CouponPolicy,
    pub stale_coupon_policy: StaleCouponPolicy,
    pub retry: RetryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SF_HOST.to_string(),
            port: DEFAULT_SF_PORT,
            database_url: String::default(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            use_wal: true,
            coupon_policy: CouponPolicy::default(),
            stale_coupon_policy: StaleCouponPolicy::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let host = env::var("SF_HOST").ok().unwrap_or_else(|| DEFAULT_SF_HOST.into());
        let port = env_or_default("SF_PORT", DEFAULT_SF_PORT);
        let database_url = db_url();
        let db_max_connections = env_or_default("SF_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS).max(1);
        let use_wal = parse_boolean_flag(env::var("SF_USE_WAL").ok(), true);
        let coupon_policy = coupon_policy_from_env(defaults.coupon_policy);
        let stale_coupon_policy = env_or_default("SF_STALE_COUPON_POLICY", defaults.stale_coupon_policy);
        let retries = env_or_default("SF_STORAGE_RETRIES", defaults.retry.max_attempts);
        let retry = defaults.retry.with_max_attempts(retries);
        Self { host, port, database_url, db_max_connections, use_wal, coupon_policy, stale_coupon_policy, retry }
    }
}

fn coupon_policy_from_env(defaults: CouponPolicy) -> CouponPolicy {
    let threshold = env_or_default("SF_COUPON_THRESHOLD", defaults.threshold);
    let discount = env_or_default("SF_COUPON_DISCOUNT", defaults.discount.value());
    let discount = DiscountRate::new(discount).unwrap_or_else(|e| {
        error!("🪛️ Invalid value for SF_COUPON_DISCOUNT. {e}. Using the default, {}, instead.", defaults.discount);
        defaults.discount
    });
    let mut code_length = env_or_default("SF_COUPON_CODE_LENGTH", defaults.code_length);
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code_length) {
        error!(
            "🪛️ SF_COUPON_CODE_LENGTH must be between {MIN_CODE_LENGTH} and {MAX_CODE_LENGTH}. Using the default, {}, \
             instead.",
            defaults.code_length
        );
        code_length = defaults.code_length;
    }
    let anchor: RedemptionAnchor = env_or_default("SF_REDEMPTION_ANCHOR", defaults.anchor);
    info!("🪛️ Coupons: {discount} off after {threshold} orders, counted from {anchor}");
    CouponPolicy { threshold, discount, code_length, anchor, ..defaults }
}

/// Reads and parses the environment variable `name`, falling back to `default` (with an error in the log) if the value
/// is invalid.
fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Clone,
    T::Err: Display,
{
    parse_or_default(env::var(name).ok(), default.clone()).unwrap_or_else(|e| {
        error!("🪛️ Invalid value for {name}. {e} Using the default, {default}, instead.");
        default
    })
}
