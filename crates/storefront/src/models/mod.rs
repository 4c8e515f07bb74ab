//! Domain models for the storefront client.
//!
//! These mirror the backend's JSON resources. Field names follow the wire
//! format through serde renames; Rust-side names are English.

pub mod cart;
pub mod catalog;
pub mod dashboard;
pub mod session;
pub mod user;

pub use cart::{CartItem, CartProduct, CartSnapshot};
pub use catalog::{Category, Product};
pub use dashboard::{BestSeller, DashboardStats};
pub use session::{CurrentUser, SessionStore};
pub use user::User;
