//! Shopping cart entries and merge rules.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s, unique by the pair
//! `(product id, variant id)`. Items are snapshots: price, MRP and image are
//! copied from the product (or the chosen variant) when the item is first
//! added, so later catalog edits never change what is already in a cart.
//!
//! Callers outside the cart address an entry through its composite
//! identifier, `productId` or `productId-variantId` (see [`CartItemKey`]).

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariantId};
use super::money::Money;
use super::product::{Product, Variant};

/// Identity of a cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartItemKey {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
}

impl CartItemKey {
    /// Create a key for a product and optional variant.
    #[must_use]
    pub const fn new(product_id: ProductId, variant_id: Option<VariantId>) -> Self {
        Self {
            product_id,
            variant_id,
        }
    }

    /// Whether `composite_id` is this key's composite identifier.
    #[must_use]
    pub fn matches(&self, composite_id: &str) -> bool {
        matches_composite(&self.product_id, self.variant_id.as_ref(), composite_id)
    }
}

fn matches_composite(
    product_id: &ProductId,
    variant_id: Option<&VariantId>,
    composite_id: &str,
) -> bool {
    let Some(rest) = composite_id.strip_prefix(product_id.as_str()) else {
        return false;
    };
    match variant_id {
        None => rest.is_empty(),
        Some(variant) => rest.strip_prefix('-') == Some(variant.as_str()),
    }
}

impl fmt::Display for CartItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant_id {
            Some(variant) => write!(f, "{}-{}", self.product_id, variant),
            None => write!(f, "{}", self.product_id),
        }
    }
}

/// A product snapshot in the cart, with quantity and chosen variant.
///
/// Field names follow the stored cart record (`variantId`, `selectedSize`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product id (not the composite identifier).
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub image: String,
    pub mrp: Money,
    pub price: Money,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    /// Variant name at the time of adding, kept for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
}

impl CartItem {
    /// Snapshot a product (and optional variant) into a new cart entry.
    ///
    /// Price and MRP come from the variant when one is chosen. The image comes
    /// from the variant only when [`Variant::image_override`] yields one.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: u32, variant: Option<&Variant>) -> Self {
        let image = variant
            .and_then(Variant::image_override)
            .unwrap_or(&product.image)
            .to_string();

        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            image,
            mrp: variant.map_or(product.mrp, |v| v.mrp),
            price: variant.map_or(product.price, |v| v.price),
            stock: product.stock,
            description: product.description.clone(),
            tags: product.tags.clone(),
            quantity,
            variant_id: variant.map(|v| v.id.clone()),
            selected_size: variant.map(|v| v.name.clone()),
        }
    }

    /// The entry's identity.
    #[must_use]
    pub fn key(&self) -> CartItemKey {
        CartItemKey::new(self.id.clone(), self.variant_id.clone())
    }

    /// The composite identifier used by the display layer.
    #[must_use]
    pub fn composite_id(&self) -> String {
        self.key().to_string()
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }

    fn is_same_entry(&self, product_id: &ProductId, variant_id: Option<&VariantId>) -> bool {
        &self.id == product_id && self.variant_id.as_ref() == variant_id
    }

    fn matches(&self, composite_id: &str) -> bool {
        matches_composite(&self.id, self.variant_id.as_ref(), composite_id)
    }
}

/// An ordered collection of cart entries.
///
/// Totals are always derived from the entries. Deserialization goes through
/// [`Cart::from_items`], so decoded carts obey the same invariants as carts
/// built through [`Cart::add`].
///
/// ```
/// use asthmi_core::{Cart, Money, Product, ProductId};
///
/// let product = Product {
///     id: ProductId::new("agarbatti"),
///     name: "Sandal Agarbatti".into(),
///     category: "Incense".into(),
///     image: "https://cdn.example.com/a.png".into(),
///     mrp: Money::from_rupees(12),
///     price: Money::from_rupees(10),
///     stock: 100,
///     description: String::new(),
///     variants: Vec::new(),
///     tags: Vec::new(),
/// };
///
/// let mut cart = Cart::new();
/// cart.add(&product, 2, None);
/// cart.add(&product, 1, None);
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.count(), 3);
/// assert_eq!(cart.total(), Money::from_rupees(30));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from decoded entries.
    ///
    /// Entries with a zero quantity are dropped. Entries sharing a
    /// `(product, variant)` pair are merged into the first one, summing
    /// quantities.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match merged
                .iter_mut()
                .find(|existing| existing.is_same_entry(&item.id, item.variant_id.as_ref()))
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => merged.push(item),
            }
        }
        Self { items: merged }
    }

    /// Add a product, or increase the quantity of its existing entry.
    ///
    /// A quantity of zero is treated as one.
    pub fn add(&mut self, product: &Product, quantity: u32, variant: Option<&Variant>) {
        let quantity = quantity.max(1);
        let variant_id = variant.map(|v| &v.id);

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.is_same_entry(&product.id, variant_id))
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(CartItem::snapshot(product, quantity, variant));
    }

    /// Remove the entry addressed by `composite_id`.
    ///
    /// Returns `true` if an entry was removed; an unknown id leaves the cart
    /// unchanged.
    pub fn remove(&mut self, composite_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.matches(composite_id));
        self.items.len() != before
    }

    /// Add `delta` to the quantity of the entry addressed by `composite_id`.
    ///
    /// The entry is removed when its quantity would drop to zero or below.
    /// Returns `true` if an entry matched.
    pub fn update_quantity(&mut self, composite_id: &str, delta: i64) -> bool {
        let mut matched = false;
        self.items.retain_mut(|item| {
            if !item.matches(composite_id) {
                return true;
            }
            matched = true;
            let next = i64::from(item.quantity).saturating_add(delta);
            if next <= 0 {
                return false;
            }
            item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
            true
        });
        matched
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price times quantity over all entries.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up an entry by composite identifier.
    #[must_use]
    pub fn get(&self, composite_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(composite_id))
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the cart and return its entries.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
