//! A single value mirrored to durable storage.
//!
//! [`PersistedValue`] initializes from storage (falling back to a caller
//! default) and writes the full value back on every change, starting with
//! the initial value itself. There is no merging or versioning; the last
//! write wins.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rocketshoes_storefront::persist::PersistedValue;
//! use rocketshoes_storefront::storage::MemoryStorage;
//!
//! # fn main() -> Result<(), rocketshoes_storefront::storage::StorageError> {
//! let storage = Arc::new(MemoryStorage::new());
//! let mut theme = PersistedValue::create(storage.clone(), "@RocketShoes:theme", "light".to_string())?;
//! theme.set("dark".to_string())?;
//!
//! let reloaded = PersistedValue::create(storage, "@RocketShoes:theme", "light".to_string())?;
//! assert_eq!(reloaded.get(), "dark");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::storage::{Storage, StorageError, load_json, save_json};

/// A value of type `T` kept in sync with one storage key.
pub struct PersistedValue<T> {
    key: String,
    value: T,
    storage: Arc<dyn Storage>,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Load `key` from storage, or use `initial` if the key is absent, and
    /// write the resulting value back.
    ///
    /// A stored value that cannot be decoded as `T` is logged and replaced
    /// by `initial`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or written.
    pub fn create(
        storage: Arc<dyn Storage>,
        key: impl Into<String>,
        initial: T,
    ) -> Result<Self, StorageError> {
        let key = key.into();

        let value = match load_json::<T>(storage.as_ref(), &key) {
            Ok(Some(stored)) => stored,
            Ok(None) => initial,
            Err(StorageError::Json { source, .. }) => {
                warn!(key = %key, error = %source, "Discarding undecodable stored value");
                initial
            }
            Err(e) => return Err(e),
        };

        save_json(storage.as_ref(), &key, &value)?;

        Ok(Self {
            key,
            value,
            storage,
        })
    }

    /// Replace the value and write it through.
    ///
    /// The held value only changes if the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub fn set(&mut self, value: T) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), &self.key, &value)?;
        self.value = value;
        Ok(())
    }

    /// Derive the next value from the current one and write it through.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub fn update<F>(&mut self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next)
    }
}

impl<T> PersistedValue<T> {
    /// Borrow the current value.
    #[must_use]
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// The storage key this value is mirrored to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Take the current value, leaving storage as it is.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedValue")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
