//! Storefront Engine
//!
//! The storefront engine takes orders for a small storefront and runs its promotional coupon: a single, shared
//! discount code that is minted once enough orders have come in since the last one was used.
//!
//! The library is divided into these main sections:
//! 1. Storage backends. The [`traits`] module defines what a backend must do, and [`SqliteDatabase`] is the SQLite
//!    implementation. The data types stored by the backends are defined in [`db_types`] and are public.
//! 2. The public API ([`CouponApi`], [`OrderIntakeApi`] and [`LedgerApi`]). This is what the server talks to. It is
//!    responsible for pricing and accepting orders, managing the coupon lifecycle and summarizing sales.
//!
//! The engine also emits events when orders are accepted and coupons are minted or redeemed. See [`events`] for how to
//! hook into them.
#[cfg(feature = "sqlite")]
mod sqlite;
mod sf_api;

pub mod cart;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use sf_api::{
    coupon_api::{is_eligible_for_mint, CouponApi, CouponPolicy, MintDecision, RedemptionAnchor},
    errors::{CouponApiError, OrderIntakeError},
    ledger_api::LedgerApi,
    order_intake_api::{DiagnosticsSnapshot, IntakeDiagnostics, OrderIntakeApi, StaleCouponPolicy},
    order_objects,
    stats,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db::db_url, SqliteDatabase};
