//! Ashok Asthmi Core - Shared types library.
//!
//! This crate provides the domain types used across the storefront components:
//! - `storefront` - Public-facing shop, cart and WhatsApp checkout
//! - `cli` - Migrations, catalog seeding and offline cart tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. The cart merge rules live here so every surface
//! that touches a cart applies them identically.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, money, catalog records, stock levels and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
