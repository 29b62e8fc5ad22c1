//! Product and stock lookups.
//!
//! # Architecture
//!
//! - [`Catalog`] is the port the cart store depends on: two read-only lookups
//! - [`HttpCatalog`] is the REST implementation (`GET stock/{id}`, `GET products/{id}`)
//! - Product records are cached in memory via `moka`; stock is always fetched live
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_storefront::catalog::{Catalog, HttpCatalog};
//!
//! let catalog = HttpCatalog::new(&config)?;
//! let stock = catalog.stock(ProductId::new(1)).await?;
//! let product = catalog.product(ProductId::new(1)).await?;
//! ```

mod client;

pub use client::HttpCatalog;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API has no record for this product.
    #[error("{resource} not found for product {product_id}")]
    NotFound {
        resource: &'static str,
        product_id: ProductId,
    },

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Base URL could not be joined with a request path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Read-only access to product records and live stock levels.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the current stock level for a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the lookup fails or the product is unknown.
    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError>;

    /// Fetch the product record.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the lookup fails or the product is unknown.
    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError>;
}
