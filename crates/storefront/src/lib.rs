//! Ashok Asthmi storefront library.
//!
//! Catalog browsing, the session cart and the WhatsApp order handoff,
//! exposed as a library so the CLI and integration tests can reuse them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;
