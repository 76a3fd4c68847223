//! The coupon lifecycle.
//!
//! The storefront has a single, shared discount coupon. A coupon is minted once enough orders have been placed since
//! the last coupon was redeemed, stays available until an order uses it, and is then kept forever as a redeemed
//! coupon. At most one coupon is available at any time.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{Coupon, DiscountRate, MintOutcome, NewCoupon},
    events::{CouponMintedEvent, EventProducers},
    helpers::{generate_coupon_code, retry_storage, RetryConfig},
    order_objects::OrderQueryFilter,
    sf_api::errors::CouponApiError,
    traits::{CouponStore, OrderLedger},
};

/// Whether enough orders have accumulated to mint a new coupon.
pub fn is_eligible_for_mint(orders_since_last_redemption: u64, threshold: u64) -> bool {
    orders_since_last_redemption >= threshold
}

/// The point in time after which orders count towards the next coupon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedemptionAnchor {
    /// When the most recently redeemed coupon was created
    #[default]
    CouponCreated,
    /// When the most recent order that used a coupon was placed
    CouponOrder,
}

impl FromStr for RedemptionAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "coupon_created" => Ok(Self::CouponCreated),
            "coupon_order" => Ok(Self::CouponOrder),
            _ => Err(format!("Invalid redemption anchor: {s}. Use coupon_created or coupon_order")),
        }
    }
}

impl Display for RedemptionAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CouponCreated => write!(f, "coupon_created"),
            Self::CouponOrder => write!(f, "coupon_order"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouponPolicy {
    /// Orders required since the last redemption before a new coupon is minted
    pub threshold: u64,
    /// Discount rate of newly minted coupons
    pub discount: DiscountRate,
    pub code_length: usize,
    pub anchor: RedemptionAnchor,
    /// How many fresh codes to try when a generated code collides with an old one
    pub max_code_attempts: u32,
}

impl Default for CouponPolicy {
    fn default() -> Self {
        Self {
            threshold: 3,
            discount: DiscountRate::new(0.1).unwrap_or_default(),
            code_length: 5,
            anchor: RedemptionAnchor::default(),
            max_code_attempts: 5,
        }
    }
}

/// The outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq)]
pub enum MintDecision {
    /// A coupon was already available, so nothing was minted.
    Existing(Coupon),
    /// A new coupon was minted.
    Minted(Coupon),
    NotEligible { orders_since: u64, threshold: u64 },
}

impl MintDecision {
    pub fn into_coupon(self) -> Option<Coupon> {
        match self {
            Self::Existing(c) | Self::Minted(c) => Some(c),
            Self::NotEligible { .. } => None,
        }
    }
}

pub struct CouponApi<B> {
    db: B,
    policy: CouponPolicy,
    retry: RetryConfig,
    producers: EventProducers,
}

impl<B> std::fmt::Debug for CouponApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CouponApi ({:?})", self.policy)
    }
}

impl<B> CouponApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, policy: CouponPolicy::default(), retry: RetryConfig::default(), producers }
    }

    pub fn with_policy(mut self, policy: CouponPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn policy(&self) -> &CouponPolicy {
        &self.policy
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CouponApi<B>
where B: CouponStore + OrderLedger
{
    /// The coupon that customers can currently use, if there is one.
    pub async fn current_available(&self) -> Result<Option<Coupon>, CouponApiError> {
        let db = &self.db;
        let coupon = retry_storage(&self.retry, "fetch_available_coupon", move || db.fetch_available_coupon()).await?;
        Ok(coupon)
    }

    /// Looks up any coupon, used or not, by its code.
    pub async fn lookup(&self, code: &str) -> Result<Option<Coupon>, CouponApiError> {
        let db = &self.db;
        let coupon = retry_storage(&self.retry, "fetch_coupon", move || db.fetch_coupon(code)).await?;
        Ok(coupon)
    }

    /// The time after which orders count towards the next coupon. `None` means no coupon has been redeemed yet, so every
    /// order counts.
    pub async fn redemption_anchor(&self) -> Result<Option<DateTime<Utc>>, CouponApiError> {
        let db = &self.db;
        let anchor = match self.policy.anchor {
            RedemptionAnchor::CouponCreated => {
                retry_storage(&self.retry, "fetch_last_redeemed_coupon", move || db.fetch_last_redeemed_coupon())
                    .await?
                    .map(|c| c.created_at)
            },
            RedemptionAnchor::CouponOrder => {
                let filter = OrderQueryFilter::default().with_coupon_used(true);
                retry_storage(&self.retry, "latest_order_where", move || db.latest_order_where(filter.clone()))
                    .await?
                    .map(|o| o.created_at)
            },
        };
        Ok(anchor)
    }

    /// Counts the orders placed after the [redemption anchor](Self::redemption_anchor).
    pub async fn orders_since_last_redemption(&self) -> Result<u64, CouponApiError> {
        let since = self.redemption_anchor().await?;
        let db = &self.db;
        let count = retry_storage(&self.retry, "count_orders", move || db.count_orders(since)).await?;
        trace!("🎟️ {count} orders since the last redemption ({since:?})");
        Ok(count)
    }

    /// Mints a new coupon at the given rate, unless one is already available, in which case that coupon is returned.
    ///
    /// When several callers mint at the same time, exactly one coupon is created and everyone gets it back.
    pub async fn mint(&self, rate: DiscountRate) -> Result<Coupon, CouponApiError> {
        match self.mint_or_fetch(rate).await? {
            MintDecision::Existing(c) | MintDecision::Minted(c) => Ok(c),
            MintDecision::NotEligible { .. } => Err(CouponApiError::InternalError("Mint was not attempted".into())),
        }
    }

    async fn mint_or_fetch(&self, rate: DiscountRate) -> Result<MintDecision, CouponApiError> {
        let db = &self.db;
        for attempt in 1..=self.policy.max_code_attempts {
            let coupon = NewCoupon::new(generate_coupon_code(self.policy.code_length), rate);
            let outcome =
                retry_storage(&self.retry, "insert_coupon", move || db.insert_coupon_if_none_available(coupon.clone()))
                    .await?;
            match outcome {
                MintOutcome::Created(coupon) => {
                    info!("🎟️ New coupon minted: {coupon}");
                    self.call_coupon_minted_hook(&coupon).await;
                    return Ok(MintDecision::Minted(coupon));
                },
                MintOutcome::AlreadyAvailable(coupon) => {
                    debug!("🎟️ Coupon {coupon} was minted elsewhere first");
                    return Ok(MintDecision::Existing(coupon));
                },
                MintOutcome::CodeTaken(code) => {
                    debug!("🎟️ Code {code} is taken (attempt {attempt}). Trying another one.");
                },
            }
        }
        warn!("🎟️ Gave up minting after {} code collisions", self.policy.max_code_attempts);
        Err(CouponApiError::CodesExhausted(self.policy.max_code_attempts))
    }

    /// Marks the coupon as used. Of several concurrent redemptions of the same code, exactly one succeeds.
    pub async fn redeem(&self, code: &str) -> Result<Coupon, CouponApiError> {
        let db = &self.db;
        let coupon = retry_storage(&self.retry, "redeem_coupon", move || db.redeem_coupon(code)).await?;
        info!("🎟️ Coupon {coupon} redeemed");
        Ok(coupon)
    }

    /// Returns the available coupon. If there is none, mints one if enough orders have accumulated since the last
    /// redemption.
    pub async fn check_and_mint(&self) -> Result<MintDecision, CouponApiError> {
        if let Some(coupon) = self.current_available().await? {
            return Ok(MintDecision::Existing(coupon));
        }
        let orders_since = self.orders_since_last_redemption().await?;
        let threshold = self.policy.threshold;
        if is_eligible_for_mint(orders_since, threshold) {
            self.mint_or_fetch(self.policy.discount).await
        } else {
            debug!("🎟️ Not eligible for a coupon yet. {orders_since}/{threshold} orders since the last redemption");
            Ok(MintDecision::NotEligible { orders_since, threshold })
        }
    }

    async fn call_coupon_minted_hook(&self, coupon: &Coupon) {
        for emitter in &self.producers.coupon_minted_producer {
            debug!("🎟️ Notifying coupon minted hook subscribers");
            emitter.publish_event(CouponMintedEvent::new(coupon.clone())).await;
        }
    }
}
