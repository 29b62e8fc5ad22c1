//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart store against the stub API and file storage
//! - `http_catalog` - REST catalog client against the stub API
//! - `persisted_value` - Persisted values across reloads
//!
//! The stub API is an in-process `axum` server bound to an ephemeral port,
//! serving the same `stock/{id}` and `products/{id}` routes as the real
//! storefront API.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_storefront::config::CatalogConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

#[derive(Default)]
struct StubState {
    products: Mutex<HashMap<i32, Value>>,
    stock: Mutex<HashMap<i32, u32>>,
    forced_status: Mutex<Option<StatusCode>>,
    stock_hits: AtomicUsize,
    product_hits: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stub of the storefront stock/products API.
///
/// Dropping it stops the server.
pub struct StubApi {
    base_url: Url,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubApi {
    /// Start the server on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());

        let router = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub API listener");
        let addr = listener.local_addr().expect("stub API address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("stub API URL");
        Self {
            base_url,
            state,
            server,
        }
    }

    /// Register a product record (as raw JSON) and its stock level.
    ///
    /// # Panics
    ///
    /// Panics if `record` has no integer `id`.
    #[allow(clippy::expect_used)]
    pub fn add_product(&self, record: Value, stock: u32) {
        let id = record["id"]
            .as_i64()
            .and_then(|id| i32::try_from(id).ok())
            .expect("product record needs an integer id");
        lock(&self.state.products).insert(id, record);
        self.set_stock(id, stock);
    }

    pub fn set_stock(&self, id: i32, amount: u32) {
        lock(&self.state.stock).insert(id, amount);
    }

    /// Answer every request with `status` until cleared with `None`.
    pub fn force_status(&self, status: Option<StatusCode>) {
        *lock(&self.state.forced_status) = status;
    }

    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Catalog configuration pointing at this server.
    #[must_use]
    pub fn catalog_config(&self, product_cache_ttl: Duration) -> CatalogConfig {
        CatalogConfig {
            api_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(5),
            product_cache_ttl,
        }
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn forced(state: &StubState) -> Option<Response> {
    let status = *lock(&state.forced_status);
    status.map(|status| (status, Json(json!({ "error": "forced" }))).into_response())
}

async fn stock(State(state): State<Arc<StubState>>, Path(id): Path<i32>) -> Response {
    state.stock_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = forced(&state) {
        return response;
    }

    let amount = lock(&state.stock).get(&id).copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn product(State(state): State<Arc<StubState>>, Path(id): Path<i32>) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = forced(&state) {
        return response;
    }

    let record = lock(&state.products).get(&id).cloned();
    match record {
        Some(record) => Json(record).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}
