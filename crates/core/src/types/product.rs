//! Catalog records as served by the products and stock endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Price, ProductId};

/// A product, either as returned by the catalog or as a cart line.
///
/// `amount` is the quantity currently in the cart. The products endpoint
/// may omit it, in which case it deserializes as 0.
///
/// Fields the cart does not interpret are kept in `extra` and written back
/// unchanged, so a cart line carries the whole catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub amount: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with no image, no extra fields and amount 0.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: None,
            amount: 0,
            extra: Map::new(),
        }
    }

    /// Return this product with its cart quantity replaced.
    #[must_use]
    pub fn with_amount(self, amount: u32) -> Self {
        Self { amount, ..self }
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// Maximum purchasable quantity for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

impl Stock {
    /// Whether `quantity` units can be purchased.
    #[must_use]
    pub const fn allows(&self, quantity: u32) -> bool {
        quantity <= self.amount
    }
}
