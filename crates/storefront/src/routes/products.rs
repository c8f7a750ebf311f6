//! Product and category route handlers (JSON).

use asthmi_core::{Category, Product, ProductId, StockStatus, VariantId};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{ListingQuery, featured_categories, listing::FEATURED_CATEGORY_LIMIT};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// A product with the derived fields the shop front displays.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub discount_percent: u32,
    pub stock_status: StockStatus,
    pub badge: Option<String>,
}

impl ProductSummary {
    #[must_use]
    pub fn new(product: Product, low_stock_threshold: u32) -> Self {
        let stock_status = product.stock_status(low_stock_threshold);
        Self {
            discount_percent: product.discount_percent(),
            badge: stock_status.badge(),
            stock_status,
            product,
        }
    }
}

/// Product detail payload.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    /// Variant selected when the page opens
    pub default_variant: Option<VariantId>,
    pub related: Vec<ProductSummary>,
}

/// Category listing payload.
#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
    /// Categories shown on the home page, in catalog order
    pub featured: Vec<String>,
}

/// Product listing with search, category, price and sort filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<ProductSummary>>> {
    let config = state.config();
    let products = state.catalog().products().await?;

    let summaries = query
        .apply(products, config.max_price_filter)
        .into_iter()
        .map(|p| ProductSummary::new(p, config.low_stock_threshold))
        .collect();

    Ok(Json(summaries))
}

/// Product detail with related products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>> {
    let threshold = state.config().low_stock_threshold;
    let id = ProductId::new(id);
    let product = state
        .catalog()
        .product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let related = state
        .catalog()
        .related(&product)
        .await?
        .into_iter()
        .map(|p| ProductSummary::new(p, threshold))
        .collect();

    Ok(Json(ProductDetail {
        default_variant: product.default_variant().map(|v| v.id.clone()),
        summary: ProductSummary::new(product, threshold),
        related,
    }))
}

/// All categories plus the featured subset.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    let categories = state.catalog().categories().await?;
    let products = state.catalog().products().await?;

    Ok(Json(CategoriesResponse {
        categories,
        featured: featured_categories(&products, FEATURED_CATEGORY_LIMIT),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use asthmi_core::ProductRecord;
    use rust_decimal::Decimal;

    use super::*;

    fn product(stock: i64) -> Product {
        Product::try_from(ProductRecord {
            id: Some("kumkum".to_string()),
            name: Some("Kumkum".to_string()),
            mrp: Some(Decimal::from(60)),
            price: Some(Decimal::from(45)),
            stock: Some(stock),
            ..ProductRecord::default()
        })
        .unwrap()
    }

    #[test]
    fn test_summary_derives_discount_and_badge() {
        let summary = ProductSummary::new(product(3), 10);
        assert_eq!(summary.discount_percent, 25);
        assert_eq!(summary.stock_status, StockStatus::Low { remaining: 3 });
        assert_eq!(summary.badge.as_deref(), Some("Only 3 left"));
    }

    #[test]
    fn test_summary_serializes_flat() {
        let json = serde_json::to_value(ProductSummary::new(product(50), 10)).unwrap();
        assert_eq!(json["id"], "kumkum");
        assert_eq!(json["price"], 45);
        assert_eq!(json["discount_percent"], 25);
        assert_eq!(json["stock_status"]["status"], "in_stock");
        assert!(json["badge"].is_null());
    }
}
