//! Catalog types: products, their variants, and categories.
//!
//! Records arriving from the database or from seed files are loosely typed
//! (every field optional, amounts as numbers or strings). They are converted
//! into [`Product`] through [`ProductRecord`], which either normalizes a field
//! to a documented default or rejects the record with a [`RecordError`].

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId, VariantId};
use super::money::{Money, discount_percent};
use super::stock::StockStatus;

/// Image shown when a product has no image of its own.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://placehold.co/600x600/FFF9ED/F97316?text=Image+Coming+Soon";

/// Category assigned to products stored without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Errors raised while validating a catalog record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required field is absent or blank.
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    /// A price field is below zero.
    #[error("`{field}` cannot be negative")]
    NegativeAmount {
        /// Name of the offending field.
        field: &'static str,
    },
    /// Stock is below zero.
    #[error("stock cannot be negative (got {0})")]
    NegativeStock(i64),
    /// Two variants of the same product share an id.
    #[error("duplicate variant id `{0}`")]
    DuplicateVariant(String),
}

/// A selectable option of a product (size, weight, pack).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    pub price: Money,
    pub mrp: Money,
    /// Optional image replacing the product image. See [`Variant::image_override`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Variant {
    /// The image that should replace the product image, if any.
    ///
    /// Only a present, non-empty image counts: a missing image and an empty
    /// string both mean "use the product image".
    #[must_use]
    pub fn image_override(&self) -> Option<&str> {
        self.image.as_deref().filter(|image| !image.is_empty())
    }

    /// Percentage off MRP for this variant.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        discount_percent(self.mrp, self.price)
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub image: String,
    /// Original price (maximum retail price).
    pub mrp: Money,
    /// Selling price.
    pub price: Money,
    pub stock: u32,
    pub description: String,
    /// Options in display order; empty when the product has none.
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Product {
    /// Look up one of this product's variants.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// The variant preselected on the product page (the first one).
    #[must_use]
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Percentage off MRP for the base product.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        discount_percent(self.mrp, self.price)
    }

    /// Classify the stock count against a low-stock threshold.
    #[must_use]
    pub const fn stock_status(&self, threshold: u32) -> StockStatus {
        StockStatus::classify(self.stock, threshold)
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// =============================================================================
// Untyped records
// =============================================================================

/// A product as it arrives from storage or a seed file, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub mrp: Option<Decimal>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub description: Option<String>,
    #[serde(default)]
    pub variants: Option<Vec<VariantRecord>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// A variant as it arrives from storage or a seed file, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub mrp: Option<Decimal>,
    pub image: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn amount(value: Decimal, field: &'static str) -> Result<Money, RecordError> {
    Money::try_new(value).map_err(|_| RecordError::NegativeAmount { field })
}

impl VariantRecord {
    /// Validate against the parent product's price, which fills a missing
    /// variant price.
    fn into_variant(self, product_price: Money) -> Result<Variant, RecordError> {
        let id = non_blank(self.id).ok_or(RecordError::MissingField("variants.id"))?;
        let price = match self.price {
            Some(p) => amount(p, "variants.price")?,
            None => product_price,
        };
        let mrp = match self.mrp {
            Some(m) => amount(m, "variants.mrp")?,
            None => price,
        };

        Ok(Variant {
            name: non_blank(self.name).unwrap_or_else(|| id.clone()),
            id: VariantId::new(id),
            price,
            mrp,
            image: self.image.map(|s| s.trim().to_string()),
        })
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = RecordError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let id = non_blank(record.id).ok_or(RecordError::MissingField("id"))?;
        let name = non_blank(record.name).ok_or(RecordError::MissingField("name"))?;
        let price = amount(
            record.price.ok_or(RecordError::MissingField("price"))?,
            "price",
        )?;
        let mrp = match record.mrp {
            Some(m) => amount(m, "mrp")?,
            None => price,
        };
        let stock = match record.stock {
            None => 0,
            Some(s) if s < 0 => return Err(RecordError::NegativeStock(s)),
            Some(s) => u32::try_from(s).unwrap_or(u32::MAX),
        };

        let mut seen = HashSet::new();
        let mut variants = Vec::new();
        for raw in record.variants.unwrap_or_default() {
            let variant = raw.into_variant(price)?;
            if !seen.insert(variant.id.clone()) {
                return Err(RecordError::DuplicateVariant(variant.id.into_inner()));
            }
            variants.push(variant);
        }

        let tags = record
            .tags
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| non_blank(Some(t)))
            .collect();

        Ok(Self {
            id: ProductId::new(id),
            name,
            category: non_blank(record.category).unwrap_or_else(|| UNCATEGORIZED.to_string()),
            image: non_blank(record.image).unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            mrp,
            price,
            stock,
            description: record.description.unwrap_or_default(),
            variants,
            tags,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        ProductRecord {
            id: Some("kumkum".to_string()),
            name: Some("Kumkum Powder".to_string()),
            category: Some("Puja Essentials".to_string()),
            image: Some("https://cdn.example.com/kumkum.png".to_string()),
            mrp: Some(Decimal::new(60, 0)),
            price: Some(Decimal::new(45, 0)),
            stock: Some(40),
            description: Some("Pure sindoor".to_string()),
            variants: None,
            tags: None,
        }
    }

    #[test]
    fn test_valid_record_converts() {
        let product = Product::try_from(record()).unwrap();
        assert_eq!(product.id.as_str(), "kumkum");
        assert_eq!(product.price, Money::from_rupees(45));
        assert_eq!(product.mrp, Money::from_rupees(60));
        assert_eq!(product.stock, 40);
        assert!(product.variants.is_empty());
        assert_eq!(product.discount_percent(), 25);
    }

    #[test]
    fn test_missing_name_rejected() {
        let mut r = record();
        r.name = Some("   ".to_string());
        assert_eq!(
            Product::try_from(r).unwrap_err(),
            RecordError::MissingField("name")
        );
    }

    #[test]
    fn test_missing_price_rejected() {
        let mut r = record();
        r.price = None;
        assert_eq!(
            Product::try_from(r).unwrap_err(),
            RecordError::MissingField("price")
        );
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut r = record();
        r.mrp = Some(Decimal::new(-5, 0));
        assert_eq!(
            Product::try_from(r).unwrap_err(),
            RecordError::NegativeAmount { field: "mrp" }
        );

        let mut r = record();
        r.stock = Some(-1);
        assert_eq!(
            Product::try_from(r).unwrap_err(),
            RecordError::NegativeStock(-1)
        );
    }

    #[test]
    fn test_defaults_applied() {
        let mut r = record();
        r.mrp = None;
        r.stock = None;
        r.image = Some(String::new());
        r.category = None;
        let product = Product::try_from(r).unwrap();
        assert_eq!(product.mrp, product.price);
        assert_eq!(product.stock, 0);
        assert_eq!(product.image, PLACEHOLDER_IMAGE_URL);
        assert_eq!(product.category, UNCATEGORIZED);
    }

    #[test]
    fn test_variant_fallbacks() {
        let mut r = record();
        r.variants = Some(vec![
            VariantRecord {
                id: Some("100g".to_string()),
                name: Some("100 g".to_string()),
                price: Some(Decimal::new(80, 0)),
                mrp: None,
                image: Some(String::new()),
            },
            VariantRecord {
                id: Some("50g".to_string()),
                name: None,
                price: None,
                mrp: None,
                image: None,
            },
        ]);
        let product = Product::try_from(r).unwrap();
        let big = product.variant(&VariantId::new("100g")).unwrap();
        assert_eq!(big.mrp, Money::from_rupees(80));
        assert_eq!(big.image_override(), None);

        let small = product.variant(&VariantId::new("50g")).unwrap();
        assert_eq!(small.name, "50g");
        assert_eq!(small.price, product.price);
        assert_eq!(product.default_variant().unwrap().id.as_str(), "100g");
    }

    #[test]
    fn test_duplicate_variant_rejected() {
        let mut r = record();
        let v = VariantRecord {
            id: Some("1l".to_string()),
            price: Some(Decimal::new(10, 0)),
            ..VariantRecord::default()
        };
        r.variants = Some(vec![v.clone(), v]);
        assert_eq!(
            Product::try_from(r).unwrap_err(),
            RecordError::DuplicateVariant("1l".to_string())
        );
    }

    #[test]
    fn test_record_from_loose_json() {
        let json = r#"{
            "id": "ghee-diya",
            "name": "Ghee Diya",
            "price": "120",
            "mrp": 150,
            "stock": 5,
            "variants": null,
            "tags": ["diwali", " "]
        }"#;
        let record: ProductRecord = serde_json::from_str(json).unwrap();
        let product = Product::try_from(record).unwrap();
        assert_eq!(product.price, Money::from_rupees(120));
        assert_eq!(product.tags, vec!["diwali".to_string()]);
        assert_eq!(product.stock_status(10), StockStatus::Low { remaining: 5 });
    }

    #[test]
    fn test_image_override_requires_non_empty() {
        let mut variant = Variant {
            id: VariantId::new("v"),
            name: "V".to_string(),
            price: Money::from_rupees(1),
            mrp: Money::from_rupees(1),
            image: None,
        };
        assert_eq!(variant.image_override(), None);
        variant.image = Some(String::new());
        assert_eq!(variant.image_override(), None);
        variant.image = Some("https://cdn.example.com/v.png".to_string());
        assert_eq!(variant.image_override(), Some("https://cdn.example.com/v.png"));
    }
}
