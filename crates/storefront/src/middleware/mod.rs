//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the request span)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Rate limiting on cart mutations and checkout (governor)

pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use rate_limit::{RateLimiterLayer, cart_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, configure_session_layer, create_session_layer};
