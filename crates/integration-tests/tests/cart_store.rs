//! Integration tests for the cart store.
//!
//! Each test runs a real `CartStore` with the REST catalog client pointed at
//! the stub API and file storage in a temporary directory.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rocketshoes_core::{Cart, Price, ProductId};
use rocketshoes_integration_tests::StubApi;
use rocketshoes_storefront::catalog::HttpCatalog;
use rocketshoes_storefront::error::OUT_OF_STOCK_MESSAGE;
use rocketshoes_storefront::storage::{FileStorage, Storage, load_json};
use rocketshoes_storefront::testing::RecordingNotifier;
use rocketshoes_storefront::{CART_STORAGE_KEY, CartError, CartStore, UpdateProductAmount};
use serde_json::json;
use tempfile::TempDir;

struct TestContext {
    api: StubApi,
    dir: TempDir,
    storage: Arc<FileStorage>,
    notifier: Arc<RecordingNotifier>,
    store: CartStore,
}

impl TestContext {
    async fn new() -> Self {
        let api = StubApi::start().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let store = open_store(&api, storage.clone(), notifier.clone());
        Self {
            api,
            dir,
            storage,
            notifier,
            store,
        }
    }

    /// A second store over the same storage directory, as after a restart.
    fn reopen(&self) -> CartStore {
        let storage = Arc::new(FileStorage::open(self.dir.path()).unwrap());
        open_store(&self.api, storage, Arc::new(RecordingNotifier::new()))
    }

    fn stored_cart(&self) -> Option<Cart> {
        load_json(self.storage.as_ref(), CART_STORAGE_KEY).unwrap()
    }
}

fn open_store(
    api: &StubApi,
    storage: Arc<FileStorage>,
    notifier: Arc<RecordingNotifier>,
) -> CartStore {
    let catalog = HttpCatalog::new(&api.catalog_config(Duration::ZERO)).unwrap();
    CartStore::spawn(storage, Arc::new(catalog), notifier).unwrap()
}

fn amounts(cart: &Cart) -> Vec<(i32, u32)> {
    cart.iter().map(|p| (p.id.as_i32(), p.amount)).collect()
}

// =============================================================================
// add_product
// =============================================================================

#[tokio::test]
async fn test_add_to_empty_cart() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 5, "title": "X", "price": 10 }), 3);

    let cart = ctx.store.add_product(ProductId::new(5)).await.unwrap();

    assert_eq!(
        serde_json::to_value(&cart).unwrap(),
        json!([{ "id": 5, "title": "X", "price": 10, "amount": 1 }])
    );
    assert_eq!(ctx.stored_cart(), Some(cart));
}

#[tokio::test]
async fn test_add_keeps_full_catalog_record() {
    let ctx = TestContext::new().await;
    ctx.api.add_product(
        json!({
            "id": 1,
            "title": "Tênis de Caminhada",
            "price": 179.9,
            "image": "https://cdn.example.com/1.jpg",
            "brand": "nike",
            "sizes": [38, 39, 40]
        }),
        3,
    );

    ctx.store.add_product(ProductId::new(1)).await.unwrap();
    ctx.store.shutdown().await;

    let raw = ctx.storage.get(CART_STORAGE_KEY).unwrap().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        stored,
        json!([{
            "id": 1,
            "title": "Tênis de Caminhada",
            "price": 179.9,
            "image": "https://cdn.example.com/1.jpg",
            "brand": "nike",
            "sizes": [38, 39, 40],
            "amount": 1
        }])
    );

    let reopened = ctx.reopen();
    let line = reopened.cart().get(ProductId::new(1)).cloned().unwrap();
    assert_eq!(line.extra["brand"], "nike");
}

#[tokio::test]
async fn test_add_at_stock_limit_leaves_cart_unchanged() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 1, "title": "Tênis", "price": 179.9 }), 2);

    ctx.store.add_product(ProductId::new(1)).await.unwrap();
    ctx.store.add_product(ProductId::new(1)).await.unwrap();
    let raw_before = ctx.storage.get(CART_STORAGE_KEY).unwrap();

    let err = ctx.store.add_product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, CartError::OutOfStock { available: 2, .. }));
    assert_eq!(amounts(&ctx.store.cart()), vec![(1, 2)]);
    assert_eq!(ctx.storage.get(CART_STORAGE_KEY).unwrap(), raw_before);
    assert_eq!(
        ctx.notifier.messages(),
        vec![OUT_OF_STOCK_MESSAGE.to_string()]
    );
}

#[tokio::test]
async fn test_add_respects_stock_changes_between_calls() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 1, "title": "Tênis", "price": 179.9 }), 5);

    ctx.store.add_product(ProductId::new(1)).await.unwrap();
    ctx.api.set_stock(1, 1);

    assert!(ctx.store.add_product(ProductId::new(1)).await.is_err());
    assert_eq!(amounts(&ctx.store.cart()), vec![(1, 1)]);
}

#[tokio::test]
async fn test_add_when_api_is_failing() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 1, "title": "Tênis", "price": 179.9 }), 5);
    ctx.api
        .force_status(Some(axum::http::StatusCode::SERVICE_UNAVAILABLE));

    let err = ctx.store.add_product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Catalog(_)));
    assert!(ctx.store.cart().is_empty());
    assert!(ctx.stored_cart().is_none());
    assert_eq!(
        ctx.notifier.messages(),
        vec!["Failed to add product".to_string()]
    );
}

// =============================================================================
// remove_product / update_product_amount
// =============================================================================

#[tokio::test]
async fn test_remove_and_update_round_trip_through_storage() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 1, "title": "A", "price": 10 }), 5);
    ctx.api
        .add_product(json!({ "id": 2, "title": "B", "price": 20 }), 5);
    ctx.api
        .add_product(json!({ "id": 3, "title": "C", "price": 30 }), 5);

    for id in [1, 2, 3] {
        ctx.store.add_product(ProductId::new(id)).await.unwrap();
    }
    ctx.store
        .update_product_amount(UpdateProductAmount::new(ProductId::new(3), 4))
        .await
        .unwrap();
    let cart = ctx.store.remove_product(ProductId::new(2)).await.unwrap();

    assert_eq!(amounts(&cart), vec![(1, 1), (3, 4)]);
    assert_eq!(cart.subtotal(), Price::from(130));
    assert_eq!(ctx.stored_cart(), Some(cart));
}

#[tokio::test]
async fn test_update_above_stock_and_non_positive() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 1, "title": "A", "price": 10 }), 3);
    ctx.store.add_product(ProductId::new(1)).await.unwrap();
    let hits = ctx.api.stock_hits();

    let err = ctx
        .store
        .update_product_amount(UpdateProductAmount::new(ProductId::new(1), 4))
        .await
        .unwrap_err();
    assert!(matches!(err, CartError::OutOfStock { requested: 4, .. }));

    let cart = ctx
        .store
        .update_product_amount(UpdateProductAmount::new(ProductId::new(1), 0))
        .await
        .unwrap();
    assert_eq!(amounts(&cart), vec![(1, 1)]);

    // Only the rejected update reached the stock endpoint
    assert_eq!(ctx.api.stock_hits(), hits + 1);
    assert_eq!(
        ctx.notifier.messages(),
        vec![OUT_OF_STOCK_MESSAGE.to_string()]
    );
}

#[tokio::test]
async fn test_update_when_api_is_failing() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 1, "title": "A", "price": 10 }), 5);
    let before = ctx.store.add_product(ProductId::new(1)).await.unwrap();
    ctx.api
        .force_status(Some(axum::http::StatusCode::SERVICE_UNAVAILABLE));

    let err = ctx
        .store
        .update_product_amount(UpdateProductAmount::new(ProductId::new(1), 2))
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::Catalog(_)));
    assert_eq!(ctx.store.cart(), before);
    assert_eq!(ctx.stored_cart(), Some(before));
    assert_eq!(
        ctx.notifier.messages(),
        vec!["Failed to update product quantity".to_string()]
    );
}

#[tokio::test]
async fn test_remove_absent_product() {
    let ctx = TestContext::new().await;

    let err = ctx.store.remove_product(ProductId::new(8)).await.unwrap_err();

    assert!(matches!(err, CartError::NotInCart(_)));
    assert_eq!(
        ctx.notifier.messages(),
        vec!["Failed to remove product".to_string()]
    );
}

// =============================================================================
// Persistence and concurrency
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 2, "title": "B", "price": 20 }), 5);
    ctx.api
        .add_product(json!({ "id": 1, "title": "A", "price": 10 }), 5);

    ctx.store.add_product(ProductId::new(2)).await.unwrap();
    ctx.store.add_product(ProductId::new(1)).await.unwrap();
    ctx.store.add_product(ProductId::new(2)).await.unwrap();
    let before = ctx.store.cart();
    ctx.store.shutdown().await;

    let reopened = ctx.reopen();

    assert_eq!(reopened.cart(), before);
    assert_eq!(amounts(&reopened.cart()), vec![(2, 2), (1, 1)]);
}

#[tokio::test]
async fn test_concurrent_adds_through_clones() {
    let ctx = TestContext::new().await;
    ctx.api
        .add_product(json!({ "id": 1, "title": "A", "price": 10 }), 3);

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let store = ctx.store.clone();
            tokio::spawn(async move { store.add_product(ProductId::new(1)).await })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(amounts(&ctx.store.cart()), vec![(1, 3)]);
    assert_eq!(ctx.notifier.messages().len(), 2);
}
