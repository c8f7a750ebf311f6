//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog (JSON)
//! GET  /api/products           - Listing (q, category, max_price, sort)
//! GET  /api/products/{id}      - Product detail with related products
//! GET  /api/categories         - Categories and featured categories
//! GET  /api/search/suggestions - Search box suggestions (q)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! GET  /cart/json              - Cart lines, total and count
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Change quantity by delta (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! POST /cart/clear             - Empty cart (returns cart_items fragment)
//!
//! # Checkout
//! POST /checkout               - Redirect to WhatsApp with the order message
//! ```

pub mod cart;
pub mod products;
pub mod search;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{RateLimiterLayer, request_id_middleware};
use crate::state::AppState;

/// Create the catalog API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
        .route("/search/suggestions", get(search::suggest))
}

/// Create the cart and checkout mutation router.
pub fn mutation_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create the cart read router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/json", get(cart::json))
        .route("/cart/count", get(cart::count))
}

/// Build the full application router.
///
/// Pass `None` for `rate_limiter` when requests carry no client IP headers
/// (in-process tests); the limiter rejects those requests.
pub fn app<Store>(
    state: AppState,
    session_layer: SessionManagerLayer<Store>,
    rate_limiter: Option<RateLimiterLayer>,
) -> Router
where
    Store: SessionStore + Clone,
{
    let mut mutations = mutation_routes();
    if let Some(limiter) = rate_limiter {
        mutations = mutations.layer(limiter);
    }

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .merge(cart_routes())
        .merge(mutations)
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
