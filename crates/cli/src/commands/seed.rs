//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - id: puja
//!     name: Puja Essentials
//! products:
//!   - id: agarbatti
//!     name: Sandalwood Agarbatti
//!     category: Puja Essentials
//!     mrp: 80
//!     price: 60
//!     stock: 40
//!     variants:
//!       - id: small
//!         name: 50 sticks
//! ```
//!
//! The whole file is parsed and validated before the database is touched.

use std::collections::HashSet;
use std::path::Path;

use asthmi_core::{Category, Product, ProductRecord};
use asthmi_storefront::db::{self, ProductRepository};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::database_url;

/// Contents of a catalog seed file.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
}

/// A seed file that passed validation.
#[derive(Debug)]
pub struct ValidCatalog {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl CatalogSeed {
    /// Parse a seed file from YAML.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document does not match the seed layout.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Validate every record, collecting all problems instead of stopping at the first.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid record or duplicate id.
    pub fn validate(self) -> Result<ValidCatalog, Vec<String>> {
        let mut errors = Vec::new();

        let mut category_names = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                errors.push(format!("category {}: name is blank", category.id));
            } else if !category_names.insert(category.name.clone()) {
                errors.push(format!("category {}: duplicate name {:?}", category.id, category.name));
            }
        }

        let mut products = Vec::with_capacity(self.products.len());
        let mut product_ids = HashSet::new();
        for (index, record) in self.products.into_iter().enumerate() {
            let label = record.id.clone().unwrap_or_else(|| format!("#{index}"));
            match Product::try_from(record) {
                Ok(product) => {
                    if !product_ids.insert(product.id.clone()) {
                        errors.push(format!("product {label}: duplicate id"));
                    } else {
                        products.push(product);
                    }
                }
                Err(e) => errors.push(format!("product {label}: {e}")),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        for product in &products {
            if !category_names.is_empty() && !category_names.contains(&product.category) {
                warn!(product_id = %product.id, category = %product.category, "Product category is not listed");
            }
        }

        Ok(ValidCatalog {
            categories: self.categories,
            products,
        })
    }
}

/// Load and validate a seed file.
///
/// # Errors
///
/// Returns an error if the file is missing, not valid YAML or fails validation.
pub async fn load_catalog(file_path: &str) -> Result<ValidCatalog, Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed = CatalogSeed::from_yaml(&content)?;

    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Parsed catalog"
    );

    seed.validate().map_err(|errors| {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        format!("{} validation errors found", errors.len()).into()
    })
}

/// Seed categories and products from a YAML file.
///
/// With `dry_run`, the file is validated and nothing is written.
///
/// # Errors
///
/// Returns an error if the file is invalid, the database URL is missing or
/// an upsert fails.
pub async fn catalog(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(file_path).await?;
    info!("Catalog validated successfully");

    if dry_run {
        info!(
            categories = catalog.categories.len(),
            products = catalog.products.len(),
            "Dry run, nothing written"
        );
        return Ok(());
    }

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    for category in &catalog.categories {
        repo.upsert_category(category).await?;
    }
    for product in &catalog.products {
        repo.upsert_product(product).await?;
    }

    info!("Seeding complete!");
    info!("  Categories upserted: {}", catalog.categories.len());
    info!("  Products upserted: {}", catalog.products.len());

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r"
categories:
  - id: puja
    name: Puja Essentials
products:
  - id: agarbatti
    name: Sandalwood Agarbatti
    category: Puja Essentials
    mrp: 80
    price: 60
    stock: 40
    variants:
      - id: small
        name: 50 sticks
      - id: large
        name: 200 sticks
        price: 200
  - id: diya
    name: Brass Diya
    price: 350
";

    #[test]
    fn test_seed_parses_and_validates() {
        let catalog = CatalogSeed::from_yaml(SEED).unwrap().validate().unwrap();
        assert_eq!(catalog.categories.len(), 1);
        assert_eq!(catalog.products.len(), 2);

        let agarbatti = &catalog.products[0];
        assert_eq!(agarbatti.variants.len(), 2);
        assert_eq!(agarbatti.variants[0].price, agarbatti.price);
        assert_eq!(catalog.products[1].category, asthmi_core::UNCATEGORIZED);
    }

    #[test]
    fn test_validation_collects_every_error() {
        let seed = CatalogSeed::from_yaml(
            r"
products:
  - id: a
    name: A
    price: 10
  - id: a
    name: A again
    price: 20
  - name: No id
    price: 5
  - id: b
    name: Negative
    price: -1
",
        )
        .unwrap();

        let errors = seed.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("duplicate id"));
        assert!(errors[1].starts_with("product #2"));
        assert!(errors[2].starts_with("product b"));
    }

    #[test]
    fn test_duplicate_category_names_rejected() {
        let seed = CatalogSeed::from_yaml(
            r"
categories:
  - id: one
    name: Dairy
  - id: two
    name: Dairy
",
        )
        .unwrap();

        let errors = seed.validate().unwrap_err();
        assert_eq!(errors, ["category two: duplicate name \"Dairy\""]);
    }

    #[test]
    fn test_empty_file_is_valid() {
        let catalog = CatalogSeed::from_yaml("{}").unwrap().validate().unwrap();
        assert!(catalog.products.is_empty());
    }

    #[tokio::test]
    async fn test_load_catalog_missing_file() {
        let err = load_catalog("/nonexistent/catalog.yaml").await.unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
