//! Cart commands: open the configured store and render its contents.

use std::sync::Arc;

use rocketshoes_core::{Cart, ProductId};
use rocketshoes_storefront::catalog::HttpCatalog;
use rocketshoes_storefront::config::CartConfig;
use rocketshoes_storefront::notify::TracingNotifier;
use rocketshoes_storefront::storage::FileStorage;
use rocketshoes_storefront::{CartStore, UpdateProductAmount};
use tracing::debug;

/// Open the cart store described by the environment.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the storage directory
/// cannot be created, or the HTTP client fails to build.
pub fn open_store() -> Result<CartStore, Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    debug!(
        api_url = %config.catalog.api_url,
        storage_dir = %config.storage_dir.display(),
        "Loaded configuration"
    );

    let storage = FileStorage::open(&config.storage_dir)?;
    let catalog = HttpCatalog::new(&config.catalog)?;

    Ok(CartStore::spawn(
        Arc::new(storage),
        Arc::new(catalog),
        Arc::new(TracingNotifier),
    )?)
}

/// Set a product's quantity.
///
/// # Errors
///
/// Returns the cart error if the update is rejected.
pub async fn update(
    store: &CartStore,
    product_id: ProductId,
    amount: i64,
) -> Result<Cart, Box<dyn std::error::Error>> {
    if amount <= 0 {
        tracing::warn!(amount, "Quantity must be positive, cart left unchanged");
    }
    Ok(store
        .update_product_amount(UpdateProductAmount::new(product_id, amount))
        .await?)
}

/// Print the cart as a table or as JSON.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
#[allow(clippy::print_stdout)]
pub fn print(cart: &Cart, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(cart)?);
        return Ok(());
    }

    if cart.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }

    for line in cart {
        println!(
            "{:>6}  {:>3} x {:<40} {:>10} {:>10}",
            line.id.to_string(),
            line.amount,
            line.title,
            line.price.to_string(),
            line.line_total().to_string()
        );
    }
    println!(
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    );
    Ok(())
}
