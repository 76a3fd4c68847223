//! # Storage backend contracts
//!
//! This module defines the behaviour that a storage backend must expose in order to drive the storefront engine.
//!
//! ## Orders
//! The [`OrderLedger`] is a durable, append-only record of every order the storefront has accepted. It is the source
//! of truth for revenue and for the order counts that decide when a new coupon may be minted. Nothing in the contract
//! allows an order to be changed or removed once it has been written.
//!
//! ## Coupons
//! The [`CouponStore`] holds the storefront's single shared discount coupon, along with every coupon that has ever been
//! redeemed. Backends must guarantee that at most one unused coupon exists at any time, and that a coupon is redeemed
//! at most once, even when many requests race to mint or redeem.
//!
//! ## Traits
//! * [`StorefrontDatabase`] ties the two together and is what the server is generic over.
//! * [`OrderLedger`] appends and queries orders.
//! * [`CouponStore`] mints, looks up and redeems coupons.
mod coupon_store;
mod order_ledger;
mod storefront_database;

pub use coupon_store::CouponStore;
pub use order_ledger::OrderLedger;
pub use storefront_database::{StoreError, StorefrontDatabase};
