//! Search route handlers.

use asthmi_core::{Money, Product};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Search suggestions query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// One entry in the search box dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: Money,
}

impl From<Product> for Suggestion {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.into_inner(),
            name: product.name,
            image: product.image,
            price: product.price,
        }
    }
}

/// Search suggestions endpoint.
///
/// A blank query returns an empty list.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<Suggestion>>> {
    let products = state.catalog().search_suggestions(&query.q).await?;
    Ok(Json(products.into_iter().map(Suggestion::from).collect()))
}
