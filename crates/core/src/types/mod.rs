//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod money;
pub mod product;
pub mod stock;

pub use cart::{Cart, CartItem, CartItemKey};
pub use id::*;
pub use money::{Money, MoneyError, discount_percent};
pub use product::{
    Category, PLACEHOLDER_IMAGE_URL, Product, ProductRecord, RecordError, UNCATEGORIZED, Variant,
    VariantRecord,
};
pub use stock::{DEFAULT_LOW_STOCK_THRESHOLD, StockStatus};
