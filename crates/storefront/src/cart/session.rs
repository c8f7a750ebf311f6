//! Session-backed carts.
//!
//! Each visitor's cart lives in their tower-sessions record as the same JSON
//! string a [`CartStorage`] backend would hold. A request loads that string
//! into a [`MemoryStorage`], mutates through [`CartStore`], then commits the
//! string back to the session.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::{CartStorage, CartStore, MemoryStorage};
use crate::error::AppError;
use crate::state::AppState;

/// A [`CartStore`] loaded from the visitor's session.
#[derive(Debug)]
pub struct SessionCart {
    session: Session,
    store: CartStore<MemoryStorage>,
}

impl SessionCart {
    /// Load the cart stored under `key` in `session`.
    ///
    /// Session read failures are logged and treated as an empty cart.
    pub async fn load(session: Session, key: &str) -> Self {
        let storage = match session.get::<String>(key).await {
            Ok(Some(raw)) => MemoryStorage::with_value(key, raw),
            Ok(None) => MemoryStorage::new(),
            Err(e) => {
                tracing::warn!(error = %e, key, "Failed to read cart from session");
                MemoryStorage::new()
            }
        };

        Self {
            session,
            store: CartStore::open(storage, key),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore<MemoryStorage> {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut CartStore<MemoryStorage> {
        &mut self.store
    }

    /// Write the stored cart string back to the session.
    ///
    /// The write is skipped only when nothing is stored under the cart key,
    /// i.e. the session held no cart and none was written this request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the session store rejects the write.
    pub async fn commit(&self) -> Result<(), AppError> {
        let key = self.store.key();
        let Ok(Some(raw)) = self.store.storage().read(key) else {
            return Ok(());
        };
        self.session
            .insert(key, raw)
            .await
            .map_err(|e| AppError::Internal(format!("failed to save cart to session: {e}")))
    }
}

/// Extractor giving handlers the visitor's cart.
///
/// Rejects with an internal error when the session layer is not installed,
/// since there is nowhere to keep the cart.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentCart(cart): CurrentCart) -> String {
///     cart.store().cart_count().to_string()
/// }
/// ```
pub struct CurrentCart(pub SessionCart);

impl FromRequestParts<AppState> for CurrentCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            AppError::Internal("cart store must be initialized: no session layer".to_string())
        })?;

        Ok(Self(
            SessionCart::load(session, &state.config().cart_key).await,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use asthmi_core::{Product, ProductRecord};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product() -> Product {
        Product::try_from(ProductRecord {
            id: Some("agarbatti".to_string()),
            name: Some("Agarbatti".to_string()),
            price: Some(Decimal::from(60)),
            ..ProductRecord::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_commit_round_trips_through_session() {
        let session = session();

        let mut cart = SessionCart::load(session.clone(), "cart").await;
        cart.store_mut().add_to_cart(&product(), 2, None);
        cart.commit().await.unwrap();

        let reloaded = SessionCart::load(session, "cart").await;
        assert_eq!(reloaded.store().cart_count(), 2);
    }

    #[tokio::test]
    async fn test_untouched_cart_commits_nothing() {
        let session = session();

        let cart = SessionCart::load(session.clone(), "cart").await;
        cart.commit().await.unwrap();

        assert!(session.get::<String>("cart").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_untouched_loaded_cart_keeps_its_value() {
        let session = session();
        let mut cart = SessionCart::load(session.clone(), "cart").await;
        cart.store_mut().add_to_cart(&product(), 1, None);
        cart.commit().await.unwrap();
        let stored = session.get::<String>("cart").await.unwrap();

        let untouched = SessionCart::load(session.clone(), "cart").await;
        untouched.commit().await.unwrap();

        assert!(stored.is_some());
        assert_eq!(session.get::<String>("cart").await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_malformed_session_value_loads_empty() {
        let session = session();
        session.insert("cart", "oops").await.unwrap();

        let cart = SessionCart::load(session, "cart").await;
        assert!(cart.store().items().is_empty());
    }
}
