//! Catalog repository for products and categories.
//!
//! Rows are decoded into [`ProductRecord`]s and validated through
//! `Product::try_from`, so the database enforces nothing beyond column types.
//! Listing queries skip rows that fail validation instead of failing the page.

use asthmi_core::{Category, CategoryId, Product, ProductId, ProductRecord, VariantRecord};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;

/// Related products shown under a product detail page.
pub const RELATED_PRODUCTS_LIMIT: i64 = 4;

/// Maximum number of search suggestions returned.
pub const SEARCH_SUGGESTIONS_LIMIT: i64 = 5;

const PRODUCT_COLUMNS: &str =
    "id, name, category, image, mrp, price, stock, description, variants, tags";

/// Raw product row; every column is nullable so bad data reaches validation.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: Option<String>,
    category: Option<String>,
    image: Option<String>,
    mrp: Option<Decimal>,
    price: Option<Decimal>,
    stock: Option<i32>,
    description: Option<String>,
    variants: Option<Json<serde_json::Value>>,
    tags: Option<Vec<String>>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let variants = match self.variants {
            None | Some(Json(serde_json::Value::Null)) => None,
            Some(Json(value)) => Some(
                serde_json::from_value::<Vec<VariantRecord>>(value).map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid variants for product {}: {e}",
                        self.id
                    ))
                })?,
            ),
        };

        let id = self.id.clone();
        let record = ProductRecord {
            id: Some(self.id),
            name: self.name,
            category: self.category,
            image: self.image,
            mrp: self.mrp,
            price: self.price,
            stock: self.stock.map(i64::from),
            description: self.description,
            variants,
            tags: self.tags,
        };

        Product::try_from(record)
            .map_err(|e| RepositoryError::DataCorruption(format!("product {id}: {e}")))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    image: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            image: row.image.filter(|i| !i.trim().is_empty()),
        }
    }
}

/// Keep the rows that validate, logging the ones that don't.
fn valid_products(rows: Vec<ProductRow>) -> Vec<Product> {
    rows.into_iter()
        .filter_map(|row| match row.into_product() {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid product row");
                None
            }
        })
        .collect()
}

/// Escape `LIKE` wildcards so shopper input matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(valid_products(rows))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Other products in the same category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related_products(
        &self,
        product: &Product,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products \
             WHERE category = $1 AND id <> $2 \
             ORDER BY created_at DESC, id LIMIT $3"
        ))
        .bind(&product.category)
        .bind(&product.id)
        .bind(RELATED_PRODUCTS_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(valid_products(rows))
    }

    /// Products whose name contains `query`, case-insensitively.
    ///
    /// A blank query returns nothing without touching the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_suggestions(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products \
             WHERE name ILIKE $1 ESCAPE '\\' ORDER BY name LIMIT $2"
        ))
        .bind(like_pattern(query))
        .bind(SEARCH_SUGGESTIONS_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(valid_products(rows))
    }

    /// List all categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, image FROM storefront.categories ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Insert or replace a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let stock = i32::try_from(product.stock).unwrap_or(i32::MAX);

        sqlx::query(
            r"
            INSERT INTO storefront.products
                (id, name, category, image, mrp, price, stock, description, variants, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                category = EXCLUDED.category,
                image = EXCLUDED.image,
                mrp = EXCLUDED.mrp,
                price = EXCLUDED.price,
                stock = EXCLUDED.stock,
                description = EXCLUDED.description,
                variants = EXCLUDED.variants,
                tags = EXCLUDED.tags
            ",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.image)
        .bind(product.mrp.amount())
        .bind(product.price.amount())
        .bind(stock)
        .bind(&product.description)
        .bind(Json(&product.variants))
        .bind(&product.tags)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another category already has this name.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_category(&self, category: &Category) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.categories (id, name, image)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, image = EXCLUDED.image
            ",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.image)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict(
                format!("category name {:?} already exists", category.name),
            ),
            other => RepositoryError::Database(other),
        })?;

        Ok(())
    }
}
