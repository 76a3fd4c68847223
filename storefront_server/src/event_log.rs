//! Writes engine events to the `storefront::events` log target.
//!
//! This gives operators an audit trail of coupon activity without a separate store. Set
//! `RUST_LOG=storefront::events=info` to see only these lines.
use std::{future::Future, pin::Pin};

use log::*;
use storefront_engine::events::{EventHandlers, EventHooks};

pub const EVENT_BUFFER_SIZE: usize = 25;
const TARGET: &str = "storefront::events";

fn done() -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async {})
}

pub fn create_event_log_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            let order = ev.order;
            let coupon = order.coupon_used.as_deref().unwrap_or("none");
            info!(target: TARGET, "📬️ Order {} created. Total {} (coupon: {coupon})", order.id, order.total_price);
            done()
        })
        .on_coupon_minted(|ev| {
            info!(target: TARGET, "📬️ Coupon {} minted", ev.coupon);
            done()
        })
        .on_coupon_redeemed(|ev| {
            info!(target: TARGET, "📬️ Coupon {} redeemed by order {}", ev.coupon.code, ev.order_id);
            done()
        })
        .on_mint_failed(|ev| {
            warn!(
                target: TARGET,
                "📬️ A coupon was due after {} orders, but could not be minted. {}",
                ev.orders_since_last_redemption,
                ev.reason
            );
            done()
        });
    EventHandlers::new(EVENT_BUFFER_SIZE, hooks)
}
