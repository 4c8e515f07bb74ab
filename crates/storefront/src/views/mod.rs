//! Presentation models and independent cart consumers.

pub mod cart;

pub use cart::{CartFragment, CartItemView, CartView};
