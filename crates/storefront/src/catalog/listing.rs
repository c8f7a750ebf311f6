//! Shop listing filters and sort orders.

use asthmi_core::{Money, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Number of categories featured on the home page.
pub const FEATURED_CATEGORY_LIMIT: usize = 6;

/// Listing sort orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Catalog order (newest first).
    #[default]
    Newest,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Most stock first.
    Popularity,
}

/// Query-string parameters of the shop listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    /// Case-insensitive substring of the name or description.
    pub q: Option<String>,
    /// Exact category name; `All` or blank disables the filter.
    pub category: Option<String>,
    /// Inclusive price ceiling; defaults to the configured maximum.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Money>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Deserialize a blank form field as `None` and anything else as an amount.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let amount = s.parse::<Decimal>().map_err(serde::de::Error::custom)?;
            Money::try_new(amount)
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}

impl ListingQuery {
    /// Filter and sort `products`, which must already be in newest-first order.
    ///
    /// Sorting is stable, so ties keep catalog order.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>, default_max_price: Money) -> Vec<Product> {
        let needle = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);
        let max_price = self.max_price.unwrap_or(default_max_price);

        let mut matched: Vec<Product> = products
            .into_iter()
            .filter(|p| {
                needle.as_deref().is_none_or(|n| {
                    p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                })
            })
            .filter(|p| category.is_none_or(|c| p.category == c))
            .filter(|p| p.price <= max_price)
            .collect();

        match self.sort {
            SortOrder::Newest => {}
            SortOrder::PriceLow => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceHigh => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Popularity => matched.sort_by(|a, b| b.stock.cmp(&a.stock)),
        }

        matched
    }
}

/// The first `limit` distinct category names, in catalog order.
#[must_use]
pub fn featured_categories(products: &[Product], limit: usize) -> Vec<String> {
    let mut categories: Vec<String> = Vec::with_capacity(limit);
    for product in products {
        if categories.len() >= limit {
            break;
        }
        if !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use asthmi_core::ProductRecord;

    use super::*;

    fn product(id: &str, category: &str, price: i64, stock: i64) -> Product {
        Product::try_from(ProductRecord {
            id: Some(id.to_string()),
            name: Some(format!("{id} item")),
            category: Some(category.to_string()),
            price: Some(Decimal::from(price)),
            stock: Some(stock),
            description: Some(format!("Fresh {category}")),
            ..ProductRecord::default()
        })
        .unwrap()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("ghee", "Dairy", 550, 5),
            product("paneer", "Dairy", 120, 30),
            product("agarbatti", "Puja", 60, 100),
            product("lamp", "Puja", 6000, 2),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    const MAX: u64 = 5000;

    #[test]
    fn test_default_query_hides_items_above_max_price() {
        let result = ListingQuery::default().apply(catalog(), Money::from_rupees(MAX));
        assert_eq!(ids(&result), ["ghee", "paneer", "agarbatti"]);
    }

    #[test]
    fn test_search_matches_name_and_description() {
        let by_name = ListingQuery {
            q: Some("GHEE".to_string()),
            ..ListingQuery::default()
        };
        assert_eq!(ids(&by_name.apply(catalog(), Money::from_rupees(MAX))), ["ghee"]);

        let by_description = ListingQuery {
            q: Some("fresh puja".to_string()),
            ..ListingQuery::default()
        };
        assert_eq!(
            ids(&by_description.apply(catalog(), Money::from_rupees(MAX))),
            ["agarbatti"]
        );
    }

    #[test]
    fn test_all_category_disables_filter() {
        let all = ListingQuery {
            category: Some(ALL_CATEGORIES.to_string()),
            ..ListingQuery::default()
        };
        assert_eq!(all.apply(catalog(), Money::from_rupees(MAX)).len(), 3);

        let dairy = ListingQuery {
            category: Some("Dairy".to_string()),
            ..ListingQuery::default()
        };
        assert_eq!(
            ids(&dairy.apply(catalog(), Money::from_rupees(MAX))),
            ["ghee", "paneer"]
        );
    }

    #[test]
    fn test_sort_orders() {
        let apply = |sort| {
            let query = ListingQuery {
                sort,
                max_price: Some(Money::from_rupees(10_000)),
                ..ListingQuery::default()
            };
            query
                .apply(catalog(), Money::from_rupees(MAX))
                .into_iter()
                .map(|p| p.id.into_inner())
                .collect::<Vec<_>>()
        };

        assert_eq!(apply(SortOrder::PriceLow), ["agarbatti", "paneer", "ghee", "lamp"]);
        assert_eq!(apply(SortOrder::PriceHigh), ["lamp", "ghee", "paneer", "agarbatti"]);
        assert_eq!(apply(SortOrder::Popularity), ["agarbatti", "paneer", "ghee", "lamp"]);
        assert_eq!(apply(SortOrder::Newest), ["ghee", "paneer", "agarbatti", "lamp"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let products = vec![
            product("a", "X", 100, 1),
            product("b", "X", 100, 1),
            product("c", "X", 50, 1),
        ];
        let query = ListingQuery {
            sort: SortOrder::PriceLow,
            ..ListingQuery::default()
        };
        assert_eq!(
            ids(&query.apply(products, Money::from_rupees(MAX))),
            ["c", "a", "b"]
        );
    }

    #[test]
    fn test_query_parses_from_form_fields() {
        let query: ListingQuery = serde_json::from_value(serde_json::json!({
            "q": "ghee",
            "max_price": "",
            "sort": "price-high"
        }))
        .unwrap();
        assert_eq!(query.sort, SortOrder::PriceHigh);
        assert_eq!(query.max_price, None);

        let query: ListingQuery =
            serde_json::from_value(serde_json::json!({"max_price": "2500"})).unwrap();
        assert_eq!(query.max_price, Some(Money::from_rupees(2500)));
        assert_eq!(query.sort, SortOrder::Newest);
    }

    #[test]
    fn test_featured_categories_are_distinct_and_limited() {
        let mut products = catalog();
        for i in 0..8 {
            products.push(product(&format!("p{i}"), &format!("C{i}"), 10, 1));
        }

        let featured = featured_categories(&products, FEATURED_CATEGORY_LIMIT);
        assert_eq!(featured, ["Dairy", "Puja", "C0", "C1", "C2", "C3"]);
    }
}
