//! Admin dashboard figures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hazel_lab_core::ProductId;

/// Headline figures from `/dashboard/estadisticas`, keyed as the backend
/// names them (`totalProductos`, `totalUsuarios`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardStats(BTreeMap<String, Value>);

impl DashboardStats {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A whole-number figure; `None` if missing or not an integer.
    #[must_use]
    pub fn count(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// One row of `/dashboard/productos-mas-vendidos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestSeller {
    #[serde(default, alias = "productoId")]
    pub id: Option<ProductId>,
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "cantidadVendida", alias = "totalVendido")]
    pub units_sold: u64,
}
