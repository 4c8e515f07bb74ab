//! Catalog types: products and categories.

use serde::{Deserialize, Serialize};

use hazel_lab_core::{CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
}

/// A catalog product as returned by `GET /productos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price.
    pub cost: Price,
    #[serde(default)]
    pub stock: i32,
    /// Stock level at or below which the product is flagged for restock.
    #[serde(default)]
    pub stock_critico: Option<i32>,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Shown on the home page.
    #[serde(default)]
    pub destacado: bool,
    /// Visible in the catalog.
    #[serde(default = "default_active")]
    pub active_status: bool,
    #[serde(default)]
    pub proveedor: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.active_status && self.stock > 0
    }

    /// Whether stock has fallen to the critical threshold.
    #[must_use]
    pub fn is_stock_critical(&self) -> bool {
        self.stock_critico.is_some_and(|threshold| self.stock <= threshold)
    }
}
