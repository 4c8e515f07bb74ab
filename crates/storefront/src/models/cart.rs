//! Cart line items and the local cart snapshot.
//!
//! The backend is the source of truth for cart contents. A [`CartSnapshot`]
//! is one consumer's cached copy, replaced wholesale on every re-fetch and
//! only edited locally by the component that performed a successful mutation.

use serde::{Deserialize, Serialize};

use hazel_lab_core::{CartItemId, Price, ProductId};

/// The product side of a cart line, as embedded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub cost: Price,
}

/// One line of a user's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub quantity: u32,
    /// Missing when the product was deleted after being added.
    #[serde(rename = "producto", alias = "product", default)]
    pub product: Option<CartProduct>,
}

impl CartItem {
    /// Unit price, zero when the product is gone.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.product.as_ref().map_or(Price::ZERO, |p| p.cost)
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity)
    }
}

/// Ordered cart contents for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    items: Vec<CartItem>,
}

impl CartSnapshot {
    #[must_use]
    pub const fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines (what the navbar badge shows).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn find(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Overwrite a line's quantity in place. Returns `false` if the line is
    /// not in this snapshot.
    pub fn set_quantity(&mut self, id: CartItemId, quantity: u32) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Drop a line, keeping the order of the rest.
    pub fn remove(&mut self, id: CartItemId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }
}

impl From<Vec<CartItem>> for CartSnapshot {
    fn from(items: Vec<CartItem>) -> Self {
        Self::new(items)
    }
}
