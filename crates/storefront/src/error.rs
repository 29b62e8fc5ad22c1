//! Cart error handling.
//!
//! Every cart operation returns `Result<Cart, CartError>`. The same error is
//! also reported to the [`Notifier`](crate::notify::Notifier) using
//! [`CartError::user_message`], which hides lookup and storage details
//! behind a message for the operation that failed.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Shown when a requested quantity exceeds available stock.
pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// The cart operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    /// Generic user-visible message for a failure of this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Failed to add product",
            Self::Remove => "Failed to remove product",
            Self::UpdateAmount => "Failed to update product quantity",
        }
    }
}

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds the product's stock.
    #[error("Out of stock: product {product_id} requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product is not in the cart.
    #[error("Not in cart: product {0}")]
    NotInCart(ProductId),

    /// Stock or product lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart store task has stopped.
    #[error("Cart store is closed")]
    Closed,
}

impl CartError {
    /// Message to show the user when `operation` fails with this error.
    #[must_use]
    pub const fn user_message(&self, operation: CartOperation) -> &'static str {
        match self {
            Self::OutOfStock { .. } => OUT_OF_STOCK_MESSAGE,
            _ => operation.failure_message(),
        }
    }

    /// Whether the user can fix this by changing the request.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfStock { .. } | Self::NotInCart(_))
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::NotInCart(ProductId::new(7));
        assert_eq!(err.to_string(), "Not in cart: product 7");

        let err = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Out of stock: product 1 requested 3, available 2"
        );
    }

    #[test]
    fn test_user_messages() {
        let out_of_stock = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        };
        assert_eq!(
            out_of_stock.user_message(CartOperation::Add),
            OUT_OF_STOCK_MESSAGE
        );
        assert_eq!(
            out_of_stock.user_message(CartOperation::UpdateAmount),
            OUT_OF_STOCK_MESSAGE
        );

        let lookup = CartError::Catalog(CatalogError::Parse("bad".to_string()));
        assert_eq!(
            lookup.user_message(CartOperation::Add),
            "Failed to add product"
        );

        let missing = CartError::NotInCart(ProductId::new(2));
        assert_eq!(
            missing.user_message(CartOperation::Remove),
            "Failed to remove product"
        );
        assert_eq!(
            missing.user_message(CartOperation::UpdateAmount),
            "Failed to update product quantity"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(CartError::NotInCart(ProductId::new(1)).is_recoverable());
        assert!(!CartError::Closed.is_recoverable());
    }
}
