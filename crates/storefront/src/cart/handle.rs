//! CartStore - cloneable handle to the cart actor.

use std::sync::Arc;

use rocketshoes_core::{Cart, Product, ProductId};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;

use super::actor::CartActor;
use super::command::{CartCommand, Reply};
use super::{CART_STORAGE_KEY, UpdateProductAmount};
use crate::catalog::Catalog;
use crate::error::{CartError, CartOperation, Result};
use crate::notify::Notifier;
use crate::storage::{Storage, StorageError, load_json};

/// Queue depth between handles and the actor.
const COMMAND_BUFFER: usize = 32;

/// Handle to a running cart store.
///
/// Reads (`cart`, `subscribe`) never wait on the actor. Mutations are
/// queued and resolve once the actor has applied them. A mutation sent
/// after the actor has stopped fails with `CartError::Closed`, which is
/// reported to the notifier like any other failure.
#[derive(Clone)]
pub struct CartStore {
    tx: mpsc::Sender<CartCommand>,
    state: watch::Receiver<Cart>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.state.borrow().len())
            .field("closed", &self.tx.is_closed())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the persisted cart and create a handle plus the actor that
    /// serves it. The caller is responsible for running
    /// [`CartActor::run`].
    ///
    /// A stored cart that cannot be decoded is logged and replaced by an
    /// empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage backend cannot be read.
    pub fn create(
        storage: Arc<dyn Storage>,
        catalog: Arc<dyn Catalog>,
        notifier: Arc<dyn Notifier>,
    ) -> std::result::Result<(Self, CartActor), StorageError> {
        let cart = load_cart(storage.as_ref())?;

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let (publisher, state) = watch::channel(cart.clone());
        let actor = CartActor::new(
            cart,
            storage,
            catalog,
            Arc::clone(&notifier),
            rx,
            publisher,
        );

        Ok((
            Self {
                tx,
                state,
                notifier,
            },
            actor,
        ))
    }

    /// Load the persisted cart and run its actor on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage backend cannot be read.
    pub fn spawn(
        storage: Arc<dyn Storage>,
        catalog: Arc<dyn Catalog>,
        notifier: Arc<dyn Notifier>,
    ) -> std::result::Result<Self, StorageError> {
        let (store, actor) = Self::create(storage, catalog, notifier)?;
        tokio::spawn(actor.run());
        Ok(store)
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Receiver that is notified with every newly committed cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        let mut rx = self.state.clone();
        rx.mark_unchanged();
        rx
    }

    /// Add one unit of `product_id` to the cart.
    ///
    /// A product not yet in the cart is fetched from the catalog and
    /// appended with quantity 1. Its stock is checked first, so a product
    /// with no stock is never added: a line's amount never exceeds the
    /// stock seen when it was last changed.
    ///
    /// # Errors
    ///
    /// - `CartError::OutOfStock` if the quantity would exceed stock,
    ///   including a new product with zero stock
    /// - `CartError::Catalog` if a lookup fails
    /// - `CartError::Storage` if the cart cannot be persisted
    pub async fn add_product(&self, product_id: ProductId) -> Result<Cart> {
        self.request(CartOperation::Add, |resp| CartCommand::AddProduct {
            product_id,
            resp,
        })
            .await
    }

    /// Remove `product_id` from the cart.
    ///
    /// # Errors
    ///
    /// - `CartError::NotInCart` if no line matches
    /// - `CartError::Storage` if the cart cannot be persisted
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Cart> {
        self.request(CartOperation::Remove, |resp| CartCommand::RemoveProduct {
            product_id,
            resp,
        })
            .await
    }

    /// Set a cart line to an exact quantity. Non-positive amounts are ignored
    /// and return the unchanged cart.
    ///
    /// # Errors
    ///
    /// - `CartError::OutOfStock` if the amount exceeds stock
    /// - `CartError::NotInCart` if the product has no line
    /// - `CartError::Catalog` if the stock lookup fails
    /// - `CartError::Storage` if the cart cannot be persisted
    pub async fn update_product_amount(&self, update: UpdateProductAmount) -> Result<Cart> {
        self.request(CartOperation::UpdateAmount, |resp| {
            CartCommand::UpdateProductAmount { update, resp }
        })
            .await
    }

    /// Ask the actor to stop after the commands already queued.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(CartCommand::Shutdown).await;
    }

    async fn request<F>(&self, operation: CartOperation, make: F) -> Result<Cart>
    where
        F: FnOnce(Reply) -> CartCommand,
    {
        let (resp, rx) = oneshot::channel();
        let reply = match self.tx.send(make(resp)).await {
            Ok(()) => rx.await.ok(),
            Err(_) => None,
        };

        reply.unwrap_or_else(|| {
            warn!(?operation, "Cart store is closed");
            let err = CartError::Closed;
            self.notifier.error(err.user_message(operation));
            Err(err)
        })
    }
}

fn load_cart(storage: &dyn Storage) -> std::result::Result<Cart, StorageError> {
    match load_json::<Vec<Product>>(storage, CART_STORAGE_KEY) {
        Ok(Some(products)) => Ok(Cart::from(products)),
        Ok(None) => Ok(Cart::new()),
        Err(StorageError::Json { source, .. }) => {
            warn!(error = %source, "Stored cart is unreadable, starting empty");
            Ok(Cart::new())
        }
        Err(e) => Err(e),
    }
}
