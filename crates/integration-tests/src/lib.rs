//! Integration test helpers for the Ashok Asthmi storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process HTTP tests (no database needed)
//! cargo test -p asthmi-integration-tests
//!
//! # Database-backed tests
//! TEST_DATABASE_URL=postgres://localhost/asthmi_test \
//!     cargo test -p asthmi-integration-tests -- --ignored
//! ```
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` over an
//! in-memory session store. Carts travel between requests in the session
//! cookie, which [`TestClient`] carries forward like a browser would.

#![cfg_attr(not(test), forbid(unsafe_code))]

use asthmi_core::{DEFAULT_LOW_STOCK_THRESHOLD, Money};
use asthmi_storefront::cart::DEFAULT_CART_KEY;
use asthmi_storefront::config::{
    DEFAULT_MAX_PRICE_FILTER, DEFAULT_STORE_NAME, StorefrontConfig, WhatsAppConfig,
};
use asthmi_storefront::middleware::{SESSION_COOKIE_NAME, configure_session_layer};
use asthmi_storefront::routes;
use asthmi_storefront::state::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

/// Database URL used when `TEST_DATABASE_URL` is unset.
pub const DEFAULT_TEST_DATABASE_URL: &str = "postgres://localhost/asthmi_test";

/// Number that receives order messages in tests.
pub const TEST_ORDER_NUMBER: &str = "919812345678";

/// The test database URL.
#[must_use]
pub fn test_database_url() -> String {
    std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| DEFAULT_TEST_DATABASE_URL.to_string())
}

/// Storefront configuration for tests.
///
/// # Panics
///
/// Panics if [`TEST_ORDER_NUMBER`] is not a valid WhatsApp number.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from(test_database_url()),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        store_name: DEFAULT_STORE_NAME.to_string(),
        cart_key: DEFAULT_CART_KEY.to_string(),
        low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        max_price_filter: Money::from_rupees(DEFAULT_MAX_PRICE_FILTER),
        whatsapp: WhatsAppConfig::new(TEST_ORDER_NUMBER).expect("valid test number"),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A pool that only connects when a query runs.
///
/// # Panics
///
/// Panics if the test database URL cannot be parsed.
#[must_use]
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .max_connections(2)
        .connect_lazy(&test_database_url())
        .expect("valid test database URL")
}

/// Build the full application over `pool` with in-memory sessions and no rate limiter.
#[must_use]
pub fn test_app(pool: PgPool) -> Router {
    let state = AppState::new(test_config(), pool);
    routes::app(
        state,
        configure_session_layer(MemoryStore::default(), false),
        None,
    )
}

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is JSON")
    }

    /// A header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Drives the router and keeps the session cookie between requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    #[must_use]
    pub const fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// The current session cookie (`name=value`), once the server has set one.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    /// Send a form-encoded POST request.
    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(builder, Body::from(form.to_string())).await
    }

    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(body).expect("valid request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = session_cookie(response.headers()) {
            self.cookie = Some(cookie);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// Extract `name=value` of the session cookie from `Set-Cookie` headers.
#[must_use]
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_string)
}
