//! RocketShoes CLI - Manage the local shopping cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rocketshoes show
//!
//! # Add one unit of product 1
//! rocketshoes add 1
//!
//! # Set product 1 to three units
//! rocketshoes update 1 3
//!
//! # Remove product 1
//! rocketshoes remove 1 --json
//! ```
//!
//! Configuration comes from `ROCKETSHOES_*` environment variables (see
//! `rocketshoes_storefront::config`). Logging honours `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "rocketshoes")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    /// Print the resulting cart as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (values <= 0 are ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = commands::cart::open_store()?;

    let cart = match cli.command {
        Commands::Show => store.cart(),
        Commands::Add { product_id } => store.add_product(product_id).await?,
        Commands::Remove { product_id } => store.remove_product(product_id).await?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(&store, product_id, amount).await?
        }
    };

    store.shutdown().await;
    commands::cart::print(&cart, cli.json)
}
