//! In-memory collaborators for tests.
//!
//! Available to this crate's unit tests and, with the `test-utils` feature,
//! to other crates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, Stock};

use crate::catalog::{Catalog, CatalogError};
use crate::notify::Notifier;
use crate::storage::{MemoryStorage, Storage, StorageError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Catalog serving products and stock levels from memory.
///
/// Unknown ids answer with `CatalogError::NotFound`; `set_unavailable(true)`
/// makes every lookup fail with a 503.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, u32>>,
    latency: Option<Duration>,
    unavailable: AtomicBool,
    stock_lookups: AtomicUsize,
    product_lookups: AtomicUsize,
}

impl FakeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with `stock` units available.
    #[must_use]
    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.set_stock(product.id, stock);
        lock(&self.products).insert(product.id, product);
        self
    }

    /// Delay every lookup by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Change the stock level of a product.
    pub fn set_stock(&self, product_id: ProductId, amount: u32) {
        lock(&self.stock).insert(product_id, amount);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stock lookups served so far.
    #[must_use]
    pub fn stock_lookups(&self) -> usize {
        self.stock_lookups.load(Ordering::SeqCst)
    }

    /// Number of product lookups served so far.
    #[must_use]
    pub fn product_lookups(&self) -> usize {
        self.product_lookups.load(Ordering::SeqCst)
    }

    async fn simulate_network(&self) -> Result<(), CatalogError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError> {
        self.stock_lookups.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;

        lock(&self.stock)
            .get(&product_id)
            .map(|&amount| Stock {
                id: product_id,
                amount,
            })
            .ok_or(CatalogError::NotFound {
                resource: "stock",
                product_id,
            })
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        self.product_lookups.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;

        lock(&self.products)
            .get(&product_id)
            .cloned()
            .ok_or(CatalogError::NotFound {
                resource: "products",
                product_id,
            })
    }
}

/// Notifier that keeps every message it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}

/// Memory storage whose writes can be switched to fail.
///
/// Reads always succeed; while `set_failing(true)` is in effect every
/// `set` and `remove` returns `StorageError::Io` and leaves the contents
/// untouched.
#[derive(Debug, Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
}

impl FailingStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing contents.
    #[must_use]
    pub fn wrap(inner: MemoryStorage) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(())
    }
}

impl Storage for FailingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.remove(key)
    }
}
