use std::{
    fmt::Display,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Coupon, NewOrder, Order},
    events::{CouponRedeemedEvent, EventProducers, MintFailedEvent, OrderCreatedEvent},
    helpers::{retry_storage, RetryConfig},
    order_objects::{OrderRequest, SubmittedOrder},
    sf_api::{
        coupon_api::{is_eligible_for_mint, CouponApi, CouponPolicy},
        errors::{CouponApiError, OrderIntakeError},
    },
    traits::{CouponStore, OrderLedger},
};

/// What to do with an order that names a coupon that does not exist or has already been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleCouponPolicy {
    /// Refuse the order
    #[default]
    Reject,
    /// Accept the order at full price
    Ignore,
}

impl FromStr for StaleCouponPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            _ => Err(format!("Invalid stale coupon policy: {s}. Use reject or ignore")),
        }
    }
}

impl Display for StaleCouponPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

/// Counters for the things that can go quietly wrong during order intake.
#[derive(Debug, Default)]
pub struct IntakeDiagnostics {
    orders_accepted: AtomicU64,
    redemption_conflicts: AtomicU64,
    mint_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsSnapshot {
    pub orders_accepted: u64,
    /// Orders whose coupon could not be redeemed after the order was stored
    pub redemption_conflicts: u64,
    pub mint_failures: u64,
}

impl IntakeDiagnostics {
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            orders_accepted: self.orders_accepted.load(Ordering::Relaxed),
            redemption_conflicts: self.redemption_conflicts.load(Ordering::Relaxed),
            mint_failures: self.mint_failures.load(Ordering::Relaxed),
        }
    }
}

/// `OrderIntakeApi` accepts new orders. It prices each order, appends it to the ledger, redeems the customer's coupon
/// and mints the next coupon when enough orders have accumulated.
///
/// The order is stored before any coupon is touched. Nothing that goes wrong with the coupons afterwards undoes the
/// order.
pub struct OrderIntakeApi<B> {
    coupons: CouponApi<B>,
    stale_coupon_policy: StaleCouponPolicy,
    diagnostics: Arc<IntakeDiagnostics>,
    producers: EventProducers,
}

impl<B> std::fmt::Debug for OrderIntakeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderIntakeApi (stale coupons: {})", self.stale_coupon_policy)
    }
}

impl<B> OrderIntakeApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self {
            coupons: CouponApi::new(db, producers.clone()),
            stale_coupon_policy: StaleCouponPolicy::default(),
            diagnostics: Arc::new(IntakeDiagnostics::default()),
            producers,
        }
    }

    pub fn with_coupon_policy(mut self, policy: CouponPolicy) -> Self {
        self.coupons = self.coupons.with_policy(policy);
        self
    }

    pub fn with_stale_coupon_policy(mut self, policy: StaleCouponPolicy) -> Self {
        self.stale_coupon_policy = policy;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.coupons = self.coupons.with_retry_config(retry);
        self
    }

    /// Shares the diagnostics counters with another owner, e.g. an admin endpoint.
    pub fn with_diagnostics(mut self, diagnostics: Arc<IntakeDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn diagnostics(&self) -> &IntakeDiagnostics {
        &self.diagnostics
    }

    pub fn coupons(&self) -> &CouponApi<B> {
        &self.coupons
    }

    pub fn db(&self) -> &B {
        self.coupons.db()
    }
}

impl<B> OrderIntakeApi<B>
where B: OrderLedger + CouponStore
{
    /// Submits a new order.
    ///
    /// 1. The order is validated. Client-supplied prices are ignored and recomputed.
    /// 2. If the customer supplied a coupon code, the stored coupon's rate is applied. A code that is unknown or already
    ///    used is handled according to the [`StaleCouponPolicy`].
    /// 3. The order is appended to the ledger.
    /// 4. The coupon, if any, is redeemed. Losing a redemption race is logged, but the order stands.
    /// 5. If no coupon is available and enough orders have accumulated, a new one is minted. Failure here is logged and
    ///    counted, but the order stands.
    ///
    /// Returns the stored order and whichever coupon is available afterwards.
    pub async fn submit(&self, request: OrderRequest) -> Result<SubmittedOrder, OrderIntakeError> {
        request.validate()?;
        let code = request.coupon_code();
        let mut new_order = NewOrder::new(request.items.clone(), request.name.clone(), request.address.clone());
        if let Some(code) = code {
            new_order = self.apply_coupon(new_order, code).await?;
        }
        warn_on_tampering(&request, &new_order);

        let db = self.db();
        let order = retry_storage(self.coupons.retry_config(), "append_order", move || db.append_order(new_order.clone()))
            .await?;
        self.diagnostics.orders_accepted.fetch_add(1, Ordering::Relaxed);
        info!("🛒️ Order {} accepted for {}. Total: {}", order.id, order.name, order.total_price);
        self.call_order_created_hook(&order).await;

        if let Some(code) = &order.coupon_used {
            self.redeem_for_order(code, &order).await;
        }
        let coupon_offer = self.offer_coupon().await;
        Ok(SubmittedOrder { order, coupon_offer })
    }

    async fn apply_coupon(&self, order: NewOrder, code: String) -> Result<NewOrder, OrderIntakeError> {
        match self.coupons.lookup(&code).await? {
            Some(coupon) if coupon.is_available() => Ok(order.with_coupon(code, coupon.discount)),
            stale => {
                let reason = if stale.is_some() { "has already been used" } else { "does not exist" };
                match self.stale_coupon_policy {
                    StaleCouponPolicy::Reject => {
                        info!("🛒️ Order rejected. Coupon {code} {reason}");
                        Err(OrderIntakeError::StaleDiscount(code))
                    },
                    StaleCouponPolicy::Ignore => {
                        warn!("🛒️ Coupon {code} {reason}. The order will be charged at full price.");
                        Ok(order)
                    },
                }
            },
        }
    }

    async fn redeem_for_order(&self, code: &str, order: &Order) {
        match self.coupons.redeem(code).await {
            Ok(coupon) => self.call_coupon_redeemed_hook(&coupon, order).await,
            Err(e @ (CouponApiError::CouponAlreadyUsed(_) | CouponApiError::CouponNotFound(_))) => {
                self.diagnostics.redemption_conflicts.fetch_add(1, Ordering::Relaxed);
                warn!("🛒️ Order {} was priced with coupon {code}, but it could not be redeemed: {e}", order.id);
            },
            Err(e) => {
                self.diagnostics.redemption_conflicts.fetch_add(1, Ordering::Relaxed);
                error!("🛒️ Could not redeem coupon {code} for order {}: {e}", order.id);
            },
        }
    }

    /// The coupon to offer the customer after their order: the available one, or a fresh one if the storefront has
    /// become eligible. Never fails.
    async fn offer_coupon(&self) -> Option<Coupon> {
        match self.coupons.current_available().await {
            Ok(Some(coupon)) => return Some(coupon),
            Ok(None) => {},
            Err(e) => {
                self.record_mint_failure(e.to_string(), 0).await;
                return None;
            },
        }
        let orders_since = match self.coupons.orders_since_last_redemption().await {
            Ok(n) => n,
            Err(e) => {
                self.record_mint_failure(e.to_string(), 0).await;
                return None;
            },
        };
        if !is_eligible_for_mint(orders_since, self.coupons.policy().threshold) {
            return None;
        }
        match self.coupons.mint(self.coupons.policy().discount).await {
            Ok(coupon) => Some(coupon),
            Err(e) => {
                self.record_mint_failure(e.to_string(), orders_since).await;
                None
            },
        }
    }

    async fn record_mint_failure(&self, reason: String, orders_since_last_redemption: u64) {
        self.diagnostics.mint_failures.fetch_add(1, Ordering::Relaxed);
        error!("🛒️ Could not offer a coupon after accepting an order: {reason}");
        for emitter in &self.producers.mint_failed_producer {
            let event = MintFailedEvent { reason: reason.clone(), orders_since_last_redemption };
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            debug!("🛒️ Notifying order created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }

    async fn call_coupon_redeemed_hook(&self, coupon: &Coupon, order: &Order) {
        for emitter in &self.producers.coupon_redeemed_producer {
            debug!("🛒️ Notifying coupon redeemed hook subscribers");
            emitter.publish_event(CouponRedeemedEvent::new(coupon.clone(), order.id)).await;
        }
    }
}

/// Logs any difference between what the client claimed the order costs and what it actually costs.
fn warn_on_tampering(request: &OrderRequest, order: &NewOrder) {
    let mut mismatches = vec![];
    if let Some(subtotal) = request.subtotal.filter(|s| *s != order.subtotal) {
        mismatches.push(format!("subtotal {subtotal} (actual {})", order.subtotal));
    }
    if let Some(rate) = request.discount_applied.filter(|r| *r != order.discount_applied.value()) {
        mismatches.push(format!("discount {rate} (actual {})", order.discount_applied.value()));
    }
    if let Some(total) = request.total_price.filter(|t| *t != order.total_price) {
        mismatches.push(format!("total {total} (actual {})", order.total_price));
    }
    if !mismatches.is_empty() {
        warn!(
            "🛒️ Possible tampering. Order from {} claimed {}. The recomputed prices will be used.",
            order.name,
            mismatches.join(", ")
        );
    }
}
