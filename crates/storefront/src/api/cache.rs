//! Cache types for catalog and location responses.

use crate::models::{Category, Product};

/// Cache key for catalog listings.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    FeaturedProducts,
    Categories,
    Regions,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
    Names(Vec<String>),
}
