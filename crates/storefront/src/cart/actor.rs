//! CartActor - task that owns the cart and applies commands in order.

use std::sync::Arc;

use rocketshoes_core::{Cart, ProductId};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

use super::command::CartCommand;
use super::{CART_STORAGE_KEY, UpdateProductAmount};
use crate::catalog::Catalog;
use crate::error::{CartError, CartOperation, Result};
use crate::notify::Notifier;
use crate::storage::{Storage, StorageError, save_json};

/// Single writer for the cart.
///
/// Commands are handled strictly one after another, including the catalog
/// lookups they await, so no two mutations ever work from the same
/// snapshot. The in-memory cart is replaced only after the new value has
/// been written to storage. Storage backends are synchronous, so writes run
/// on the blocking thread pool.
pub struct CartActor {
    cart: Cart,
    storage: Arc<dyn Storage>,
    catalog: Arc<dyn Catalog>,
    notifier: Arc<dyn Notifier>,
    rx: mpsc::Receiver<CartCommand>,
    publisher: watch::Sender<Cart>,
}

impl CartActor {
    pub(crate) fn new(
        cart: Cart,
        storage: Arc<dyn Storage>,
        catalog: Arc<dyn Catalog>,
        notifier: Arc<dyn Notifier>,
        rx: mpsc::Receiver<CartCommand>,
        publisher: watch::Sender<Cart>,
    ) -> Self {
        Self {
            cart,
            storage,
            catalog,
            notifier,
            rx,
            publisher,
        }
    }

    /// Run the actor loop - processes commands until Shutdown or every
    /// handle has been dropped.
    pub async fn run(mut self) {
        debug!(lines = self.cart.len(), "Cart store started");

        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                CartCommand::AddProduct { product_id, resp } => {
                    let result = self.add_product(product_id).await;
                    self.report(CartOperation::Add, product_id, &result);
                    let _ = resp.send(result);
                }
                CartCommand::RemoveProduct { product_id, resp } => {
                    let result = self.remove_product(product_id).await;
                    self.report(CartOperation::Remove, product_id, &result);
                    let _ = resp.send(result);
                }
                CartCommand::UpdateProductAmount { update, resp } => {
                    let result = self.update_product_amount(update).await;
                    self.report(CartOperation::UpdateAmount, update.product_id, &result);
                    let _ = resp.send(result);
                }
                CartCommand::Shutdown => break,
            }
        }

        debug!("Cart store stopped");
    }

    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn add_product(&mut self, product_id: ProductId) -> Result<Cart> {
        let stock = self.catalog.stock(product_id).await?;
        let mut next = self.cart.clone();

        if let Some(current) = next.get(product_id).map(|p| p.amount) {
            let requested = current.saturating_add(1);
            if !stock.allows(requested) {
                return Err(CartError::OutOfStock {
                    product_id,
                    requested,
                    available: stock.amount,
                });
            }
            next.increment(product_id);
        } else {
            if !stock.allows(1) {
                return Err(CartError::OutOfStock {
                    product_id,
                    requested: 1,
                    available: stock.amount,
                });
            }
            let product = self.catalog.product(product_id).await?;
            next.push(product.with_amount(1));
        }

        self.commit(next).await
    }

    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn remove_product(&mut self, product_id: ProductId) -> Result<Cart> {
        let mut next = self.cart.clone();
        if next.remove(product_id).is_none() {
            return Err(CartError::NotInCart(product_id));
        }
        self.commit(next).await
    }

    #[instrument(skip_all, fields(product_id = %update.product_id, amount = update.amount))]
    async fn update_product_amount(&mut self, update: UpdateProductAmount) -> Result<Cart> {
        if update.amount <= 0 {
            debug!("Ignoring non-positive quantity");
            return Ok(self.cart.clone());
        }

        let product_id = update.product_id;
        let stock = self.catalog.stock(product_id).await?;
        let requested = u32::try_from(update.amount).unwrap_or(u32::MAX);

        if !stock.allows(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let mut next = self.cart.clone();
        if !next.set_amount(product_id, requested) {
            return Err(CartError::NotInCart(product_id));
        }
        self.commit(next).await
    }

    /// Persist `next`, then make it the current cart and publish it.
    async fn commit(&mut self, next: Cart) -> Result<Cart> {
        let storage = Arc::clone(&self.storage);
        let snapshot = next.clone();
        tokio::task::spawn_blocking(move || {
            save_json(storage.as_ref(), CART_STORAGE_KEY, &snapshot)
        })
        .await
        .map_err(|e| StorageError::Io {
            key: CART_STORAGE_KEY.to_string(),
            source: std::io::Error::other(e),
        })??;

        self.cart = next;
        self.publisher.send_replace(self.cart.clone());

        info!(
            lines = self.cart.len(),
            items = self.cart.item_count(),
            "Cart updated"
        );
        Ok(self.cart.clone())
    }

    fn report(&self, operation: CartOperation, product_id: ProductId, result: &Result<Cart>) {
        let Err(err) = result else {
            return;
        };

        if err.is_recoverable() {
            debug!(?operation, %product_id, error = %err, "Cart operation rejected");
        } else {
            warn!(?operation, %product_id, error = %err, "Cart operation failed");
        }
        self.notifier.error(err.user_message(operation));
    }
}
