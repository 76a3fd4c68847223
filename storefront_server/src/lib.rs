//! # Storefront server
//! This module hosts the HTTP server for the storefront. It is responsible for:
//! Accepting orders from the storefront front end and handing them to the order intake API.
//! Telling customers which coupon they can use.
//! Giving the shop owner sales statistics and a way to check on (and trigger) coupon minting.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `GET /coupons`: The coupon that is currently available, if any.
//! * `GET /orders`, `GET /orders/{id}`: The order ledger, most recent first.
//! * `POST /orders`: Place a new order.
//! * `GET /admin`: Sales and discount statistics.
//! * `GET /admin/discount`: Fetch the available coupon, minting one if enough orders have come in.
//! * `GET /admin/diagnostics`: Counters for redemption conflicts and failed mints.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod event_log;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
