//! Commands processed by the cart actor.

use rocketshoes_core::{Cart, ProductId};
use tokio::sync::oneshot;

use super::UpdateProductAmount;
use crate::error::Result;

/// Reply channel for a mutating command: the cart after the command, or
/// why it was rejected.
pub type Reply = oneshot::Sender<Result<Cart>>;

/// Commands sent to the [`CartActor`](super::CartActor).
#[derive(Debug)]
pub enum CartCommand {
    /// Add one unit of a product, appending it if new
    AddProduct { product_id: ProductId, resp: Reply },
    /// Drop a product's line entirely
    RemoveProduct { product_id: ProductId, resp: Reply },
    /// Set a product's line to an exact quantity
    UpdateProductAmount {
        update: UpdateProductAmount,
        resp: Reply,
    },
    /// Stop the actor
    Shutdown,
}
