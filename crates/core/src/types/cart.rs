//! The ordered, id-unique list of products a shopper has selected.

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// Cart contents in insertion order.
///
/// Serializes as a bare JSON array of products, which is also the format
/// kept in durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    products: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// All lines, in insertion order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.products.iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Sum of every line's price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.products.iter().map(Product::line_total).sum()
    }

    /// Append a product. Returns `false` and leaves the cart untouched if a
    /// line with the same id already exists.
    pub fn push(&mut self, product: Product) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.products.push(product);
        true
    }

    /// Add one unit to an existing line and return the new quantity.
    pub fn increment(&mut self, id: ProductId) -> Option<u32> {
        let product = self.products.iter_mut().find(|p| p.id == id)?;
        product.amount = product.amount.saturating_add(1);
        Some(product.amount)
    }

    /// Overwrite the quantity of an existing line. Returns `false` if the
    /// id is not in the cart.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> bool {
        match self.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Remove the line with the given id, preserving the order of the rest.
    pub fn remove(&mut self, id: ProductId) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(index))
    }
}

impl From<Vec<Product>> for Cart {
    /// Build a cart from a list, keeping the first line for any repeated id.
    fn from(products: Vec<Product>) -> Self {
        let mut cart = Self::new();
        for product in products {
            cart.push(product);
        }
        cart
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}
