//! Persisted shopping cart.
//!
//! [`CartStore`] owns the live [`Cart`] for one shopper and writes it back to a
//! [`CartStorage`] backend after every mutation. Totals are derived from the
//! items on each read and never stored.
//!
//! Loading is tolerant: a missing, unreadable or malformed stored value yields
//! an empty cart and a warning in the logs. Write failures are logged and the
//! in-memory cart keeps the change.

pub mod session;
pub mod storage;

use asthmi_core::{Cart, CartItem, Money, Product, Variant};

pub use session::{CurrentCart, SessionCart};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

/// Storage key used when none is configured.
pub const DEFAULT_CART_KEY: &str = "ashok_asthmi_cart";

/// A cart bound to the storage slot it was loaded from.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    key: String,
    cart: Cart,
}

impl<S: CartStorage> CartStore<S> {
    /// Load the cart stored under `key`, falling back to an empty cart.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = load_cart(&storage, &key);
        Self { storage, key, cart }
    }

    /// Add `quantity` units of a product (or one of its variants).
    ///
    /// A matching line has its quantity increased; otherwise a new line holding
    /// a snapshot of the product is appended.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32, variant: Option<&Variant>) {
        self.cart.add(product, quantity, variant);
        tracing::debug!(
            product_id = %product.id,
            variant_id = variant.map(|v| v.id.as_str()),
            quantity,
            "Added to cart"
        );
        self.persist();
    }

    /// Remove every line whose composite id is `item_id`.
    pub fn remove_from_cart(&mut self, item_id: &str) {
        if !self.cart.remove(item_id) {
            tracing::debug!(item_id, "Remove matched no cart line");
        }
        self.persist();
    }

    /// Change a line's quantity by `delta`; lines that drop to zero are removed.
    pub fn update_quantity(&mut self, item_id: &str, delta: i64) {
        if !self.cart.update_quantity(item_id, delta) {
            tracing::debug!(item_id, delta, "Quantity update matched no cart line");
        }
        self.persist();
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist();
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn cart_total(&self) -> Money {
        self.cart.total()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.cart.count()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage backend, dropping the live cart.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.cart) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, key = %self.key, "Failed to encode cart");
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.key, &encoded) {
            tracing::warn!(error = %e, key = %self.key, "Failed to persist cart");
        }
    }
}

fn load_cart<S: CartStorage>(storage: &S, key: &str) -> Cart {
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            tracing::warn!(error = %e, key, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };
    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!(error = %e, key, "Discarding malformed stored cart");
            Cart::new()
        }
    }
}
