//! RocketShoes Core - Shared cart domain types.
//!
//! This crate provides the types shared by every RocketShoes component:
//! - `storefront` - Cart store, persisted values, catalog client
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, products, stock records and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
