//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the visitor's session (see [`crate::cart::session`]).

use askama::Template;
use askama_web::WebTemplate;
use asthmi_core::{Cart, CartItem, ProductId, VariantId};
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::CurrentCart;
use crate::checkout::{DeliveryDetails, OrderMessage};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;

/// HTMX event fired after every cart mutation.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates and JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    /// Composite id used by update/remove forms
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub size: Option<String>,
    pub quantity: u32,
    pub price: String,
    /// Struck-through MRP, only when above the selling price
    pub mrp: Option<String>,
    pub line_total: String,
    pub image: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.composite_id(),
            product_id: item.id.to_string(),
            name: item.name.clone(),
            size: item.selected_size.clone(),
            quantity: item.quantity,
            price: item.price.to_string(),
            mrp: (item.mrp > item.price).then(|| item.mrp.to_string()),
            line_total: item.line_total().to_string(),
            image: item.image.clone(),
        }
    }
}

/// Cart display data for templates and JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: cart.total().to_string(),
            item_count: cart.count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    /// Blank when the product has no variants
    #[serde(default)]
    pub variant_id: Option<String>,
    pub quantity: Option<u32>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub delta: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub store_name: String,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

fn items_fragment(cart: &Cart) -> Response {
    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state, cart))]
pub async fn show(
    State(state): State<AppState>,
    CurrentCart(cart): CurrentCart,
) -> impl IntoResponse {
    CartShowTemplate {
        cart: CartView::from(cart.store().cart()),
        store_name: state.config().store_name.clone(),
    }
}

/// Cart lines, total and count as JSON.
#[instrument(skip(cart))]
pub async fn json(CurrentCart(cart): CurrentCart) -> Json<CartView> {
    Json(CartView::from(cart.store().cart()))
}

/// Add item to cart (HTMX).
///
/// Returns the new count badge and triggers `cart-updated`.
#[instrument(skip(state, cart), fields(cart_key = %state.config().cart_key))]
pub async fn add(
    State(state): State<AppState>,
    CurrentCart(mut cart): CurrentCart,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id.trim());
    let product = state
        .catalog()
        .product(&product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let variant = match form.variant_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(variant_id) => {
            let variant = product.variant(&VariantId::new(variant_id)).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "unknown variant {variant_id} for product {product_id}"
                ))
            })?;
            Some(variant)
        }
    };

    cart.store_mut()
        .add_to_cart(&product, form.quantity.unwrap_or(1), variant);
    cart.commit().await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    let count = cart.store().cart_count();
    tracing::info!(count, "Cart updated");

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Change a line's quantity by a delta (HTMX).
#[instrument(skip(cart))]
pub async fn update(
    CurrentCart(mut cart): CurrentCart,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    cart.store_mut().update_quantity(&form.item_id, form.delta);
    cart.commit().await?;

    tracing::info!(item_id = %form.item_id, count = cart.store().cart_count(), "Cart updated");
    Ok(items_fragment(cart.store().cart()))
}

/// Remove a line (HTMX).
#[instrument(skip(cart))]
pub async fn remove(
    CurrentCart(mut cart): CurrentCart,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    cart.store_mut().remove_from_cart(&form.item_id);
    cart.commit().await?;

    tracing::info!(item_id = %form.item_id, count = cart.store().cart_count(), "Cart updated");
    Ok(items_fragment(cart.store().cart()))
}

/// Empty the cart (HTMX).
#[instrument(skip(cart))]
pub async fn clear(CurrentCart(mut cart): CurrentCart) -> Result<Response> {
    cart.store_mut().clear_cart();
    cart.commit().await?;

    add_breadcrumb("cart", "Cleared cart", None);
    Ok(items_fragment(cart.store().cart()))
}

/// Get cart count badge (HTMX).
#[instrument(skip(cart))]
pub async fn count(CurrentCart(cart): CurrentCart) -> impl IntoResponse {
    CartCountTemplate {
        count: cart.store().cart_count(),
    }
}

/// Hand the order off to WhatsApp.
///
/// Redirects (303) to a `wa.me` link carrying the order summary. The cart is
/// left untouched so the shopper can come back to it.
#[instrument(skip(state, cart, details))]
pub async fn checkout(
    State(state): State<AppState>,
    CurrentCart(cart): CurrentCart,
    Form(details): Form<DeliveryDetails>,
) -> Result<Redirect> {
    let details = details.validate()?;
    let config = state.config();
    let message = OrderMessage::compose(&config.store_name, cart.store().cart(), &details)?;

    add_breadcrumb("checkout", "Order handed off to WhatsApp", None);
    tracing::info!(
        total = %message.total(),
        count = cart.store().cart_count(),
        "Order handed off"
    );

    Ok(Redirect::to(&message.whatsapp_url(
        &config.whatsapp.order_number,
    )))
}
