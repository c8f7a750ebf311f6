//! Offline cart tools.
//!
//! Operate on carts kept as JSON files by [`FileStorage`], using the same
//! merge rules as the storefront. Handy for reproducing a shopper's cart or
//! preparing a WhatsApp order by hand.

use std::fmt::Write as _;
use std::path::Path;

use asthmi_core::{ProductId, VariantId};
use asthmi_storefront::cart::{CartStore, FileStorage};
use asthmi_storefront::checkout::{DeliveryDetails, OrderMessage};
use tracing::info;

use super::seed::load_catalog;

/// Open the cart stored under `key` in `dir`.
pub fn open(dir: &Path, key: &str) -> CartStore<FileStorage> {
    CartStore::open(FileStorage::new(dir), key)
}

/// Render a cart as a plain-text table.
#[must_use]
pub fn render(store: &CartStore<FileStorage>) -> String {
    if store.items().is_empty() {
        return format!("Cart {:?} is empty.\n", store.key());
    }

    let mut out = String::new();
    for item in store.items() {
        let _ = write!(out, "{:<24} {}", item.composite_id(), item.name);
        if let Some(size) = &item.selected_size {
            let _ = write!(out, " [{size}]");
        }
        let _ = writeln!(out, " x{} @ {} = {}", item.quantity, item.price, item.line_total());
    }
    let _ = writeln!(
        out,
        "{} item(s), total {}",
        store.cart_count(),
        store.cart_total()
    );
    out
}

#[allow(clippy::print_stdout)]
fn print_cart(store: &CartStore<FileStorage>) {
    print!("{}", render(store));
}

/// Print the cart.
pub fn show(dir: &Path, key: &str) {
    print_cart(&open(dir, key));
}

/// Add a catalog product (or one of its variants) to the cart.
///
/// # Errors
///
/// Returns an error if the catalog file is invalid or does not contain the
/// product or variant.
pub async fn add(
    dir: &Path,
    key: &str,
    catalog_path: &str,
    product_id: &str,
    variant_id: Option<&str>,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(catalog_path).await?;
    let product_id = ProductId::new(product_id);
    let product = catalog
        .products
        .iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| format!("product {product_id} is not in {catalog_path}"))?;

    let variant = match variant_id {
        None => None,
        Some(id) => Some(
            product
                .variant(&VariantId::new(id))
                .ok_or_else(|| format!("product {product_id} has no variant {id}"))?,
        ),
    };

    let mut store = open(dir, key);
    store.add_to_cart(product, quantity, variant);
    info!(product_id = %product_id, quantity, "Added to cart");
    print_cart(&store);
    Ok(())
}

/// Change a line's quantity by `delta`.
pub fn update(dir: &Path, key: &str, item_id: &str, delta: i64) {
    let mut store = open(dir, key);
    store.update_quantity(item_id, delta);
    print_cart(&store);
}

/// Remove a line.
pub fn remove(dir: &Path, key: &str, item_id: &str) {
    let mut store = open(dir, key);
    store.remove_from_cart(item_id);
    print_cart(&store);
}

/// Empty the cart.
pub fn clear(dir: &Path, key: &str) {
    let mut store = open(dir, key);
    store.clear_cart();
    info!(key, "Cart cleared");
}

/// Compose the WhatsApp order for the cart and print the message and link.
///
/// # Errors
///
/// Returns an error if the details are incomplete or the cart is empty.
#[allow(clippy::print_stdout)]
pub fn order(
    dir: &Path,
    key: &str,
    store_name: &str,
    order_number: &str,
    details: DeliveryDetails,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open(dir, key);
    let details = details.validate()?;
    let message = OrderMessage::compose(store_name, store.cart(), &details)?;

    println!("{}\n", message.text());
    println!("{}", message.whatsapp_url(order_number));
    Ok(())
}
