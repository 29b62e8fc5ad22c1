//! RocketShoes Storefront library.
//!
//! Client-side state for the storefront: the shopping cart and a generic
//! persisted value, both mirrored to durable storage.
//!
//! # Modules
//!
//! - [`cart`] - Cart store: single-writer actor plus a cloneable handle
//! - [`persist`] - A single value kept in sync with one storage key
//! - [`storage`] - Durable key-value storage port (file and memory backends)
//! - [`catalog`] - Stock and product lookups against the storefront API
//! - [`notify`] - User-visible error notifications
//! - [`config`] - Environment-based configuration
//! - [`error`] - Cart error type and user-facing messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod persist;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use cart::{CART_STORAGE_KEY, CartStore, UpdateProductAmount};
pub use error::{CartError, CartOperation};
