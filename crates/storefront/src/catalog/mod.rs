//! Catalog reads for the storefront.
//!
//! Wraps [`ProductRepository`] with a `moka` cache (5-minute TTL). Catalog
//! edits land through the CLI seeder, so shoppers may see stale prices for up
//! to one TTL after a reseed.

mod cache;
pub mod listing;

use std::sync::Arc;
use std::time::Duration;

use asthmi_core::{Category, Product, ProductId};
use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::db::{ProductRepository, RepositoryError};
use cache::{CacheKey, CacheValue};

pub use listing::{ListingQuery, SortOrder, featured_categories};

/// Cached access to products and categories.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    /// Create a catalog service over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    fn repository(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.inner.pool)
    }

    /// All valid products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, RepositoryError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = self.repository().list_products().await?;
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// A single product, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product cannot be read or fails validation.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let product = self.repository().get_product(id).await?;
        if let Some(product) = &product {
            self.inner
                .cache
                .insert(key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }
        Ok(product)
    }

    /// Up to four other products from the same category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be read.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn related(&self, product: &Product) -> Result<Vec<Product>, RepositoryError> {
        let key = CacheKey::Related(product.id.clone());
        if let Some(CacheValue::Products(related)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for related products");
            return Ok(related);
        }

        let related = self.repository().related_products(product).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(related.clone()))
            .await;
        Ok(related)
    }

    /// All categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the categories cannot be read.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self.repository().list_categories().await?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// Name matches for the search box. Not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the search query fails.
    #[instrument(skip(self))]
    pub async fn search_suggestions(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        self.repository().search_suggestions(query).await
    }
}
