//! Shopping cart store.
//!
//! # Architecture
//!
//! The cart is owned by a single task (the [`CartActor`]) that applies
//! commands one at a time from an mpsc queue. Callers hold a cloneable
//! [`CartStore`] handle:
//!
//! - Mutations (`add_product`, `remove_product`, `update_product_amount`)
//!   are sent as commands and answered over a oneshot channel
//! - Stock and product lookups run inside the actor, so every command sees
//!   the state left by the previous one
//! - Each successful mutation writes the full cart to storage under
//!   [`CART_STORAGE_KEY`], then publishes it on a `watch` channel
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_storefront::cart::{CartStore, UpdateProductAmount};
//!
//! let store = CartStore::spawn(storage, catalog, notifier)?;
//!
//! store.add_product(ProductId::new(1)).await?;
//! store.update_product_amount(UpdateProductAmount::new(ProductId::new(1), 3)).await?;
//!
//! let mut updates = store.subscribe();
//! updates.changed().await?;
//! println!("{} items", updates.borrow().item_count());
//! ```

mod actor;
mod command;
mod handle;

pub use actor::CartActor;
pub use handle::CartStore;

use rocketshoes_core::ProductId;
use serde::{Deserialize, Serialize};

/// Storage key holding the JSON-encoded cart.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Request to set a cart line to an exact quantity.
///
/// `amount` is signed: values `<= 0` are accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

impl UpdateProductAmount {
    #[must_use]
    pub const fn new(product_id: ProductId, amount: i64) -> Self {
        Self { product_id, amount }
    }
}
