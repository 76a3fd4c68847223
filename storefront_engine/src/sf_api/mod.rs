//! # Storefront engine public API
//!
//! The `sf_api` module exposes the programmatic API for the storefront engine. Each API wraps a storage backend that
//! implements the backend traits it needs, so different parts could run against different backends.
//!
//! * [`coupon_api`] owns the coupon lifecycle: finding the available coupon, minting and redeeming.
//! * [`order_intake_api`] accepts new orders, tying order storage to coupon redemption and minting.
//! * [`ledger_api`] reads the order ledger and computes the admin [`stats`].
//!
//! # API usage
//!
//! ```rust,ignore
//! use storefront_engine::{events::EventProducers, OrderIntakeApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/storefront.db", 5).await?;
//! let api = OrderIntakeApi::new(db, EventProducers::default());
//! let submitted = api.submit(request).await?;
//! ```
pub mod coupon_api;
pub mod errors;
pub mod ledger_api;
pub mod order_intake_api;
pub mod order_objects;
pub mod stats;
