//! Stock level classification for badges.

use serde::{Deserialize, Serialize};

/// Default cutoff below which a product shows an "Only N left" badge.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// How much of a product is left, as shown to shoppers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StockStatus {
    /// Nothing left to sell.
    OutOfStock,
    /// Fewer units than the configured threshold remain.
    Low {
        /// Units left.
        remaining: u32,
    },
    /// Plenty left.
    InStock,
}

impl StockStatus {
    /// Classify a stock count against a low-stock threshold.
    ///
    /// ```
    /// use asthmi_core::StockStatus;
    ///
    /// assert_eq!(StockStatus::classify(0, 10), StockStatus::OutOfStock);
    /// assert_eq!(StockStatus::classify(3, 10), StockStatus::Low { remaining: 3 });
    /// assert_eq!(StockStatus::classify(10, 10), StockStatus::InStock);
    /// ```
    #[must_use]
    pub const fn classify(stock: u32, threshold: u32) -> Self {
        if stock == 0 {
            Self::OutOfStock
        } else if stock < threshold {
            Self::Low { remaining: stock }
        } else {
            Self::InStock
        }
    }

    /// Badge text for listings, if any.
    #[must_use]
    pub fn badge(&self) -> Option<String> {
        match self {
            Self::OutOfStock => Some("Out of stock".to_string()),
            Self::Low { remaining } => Some(format!("Only {remaining} left")),
            Self::InStock => None,
        }
    }

    /// Whether the product can still be added to a cart.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::OutOfStock)
    }
}
