//! REST client for the stock and products endpoints.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use rocketshoes_core::{Product, ProductId, Stock};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{Catalog, CatalogError};
use crate::config::CatalogConfig;

/// Maximum number of product records kept in the cache.
const PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Catalog backed by the storefront REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and product cache.
#[derive(Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: Url,
    products: Option<Cache<ProductId, Product>>,
}

impl HttpCatalog {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(config.api_url.clone()),
            products: product_cache(config.product_cache_ttl),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, resource: &str, product_id: ProductId) -> Result<Url, CatalogError> {
        Ok(self.base_url.join(&format!("{resource}/{product_id}"))?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        resource: &'static str,
        product_id: ProductId,
    ) -> Result<T, CatalogError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                resource,
                product_id,
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for HttpCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("base_url", &self.base_url.as_str())
            .field("product_cache", &self.products.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError> {
        let url = self.endpoint("stock", product_id)?;
        let stock: Stock = self.get_json(url, "stock", product_id).await?;
        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }

    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        if let Some(cache) = &self.products
            && let Some(product) = cache.get(&product_id).await
        {
            debug!("Product cache hit");
            return Ok(product);
        }

        let url = self.endpoint("products", product_id)?;
        let product: Product = self.get_json(url, "products", product_id).await?;

        if let Some(cache) = &self.products {
            cache.insert(product_id, product.clone()).await;
        }

        debug!(title = %product.title, "Fetched product");
        Ok(product)
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn product_cache(ttl: Duration) -> Option<Cache<ProductId, Product>> {
    if ttl.is_zero() {
        return None;
    }
    Some(
        Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(ttl)
            .build(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(api_url: &str, ttl_secs: u64) -> CatalogConfig {
        CatalogConfig {
            api_url: Url::parse(api_url).unwrap(),
            request_timeout: Duration::from_secs(5),
            product_cache_ttl: Duration::from_secs(ttl_secs),
        }
    }

    #[test]
    fn test_endpoint_at_host_root() {
        let catalog = HttpCatalog::new(&config("http://localhost:3333", 0)).unwrap();
        let url = catalog.endpoint("stock", ProductId::new(4)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/stock/4");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let catalog = HttpCatalog::new(&config("https://shop.example.com/api", 0)).unwrap();
        let url = catalog.endpoint("products", ProductId::new(12)).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/products/12");
    }

    #[test]
    fn test_zero_ttl_disables_product_cache() {
        let uncached = HttpCatalog::new(&config("http://localhost:3333", 0)).unwrap();
        assert!(uncached.products.is_none());

        let cached = HttpCatalog::new(&config("http://localhost:3333", 60)).unwrap();
        assert!(cached.products.is_some());
    }
}
