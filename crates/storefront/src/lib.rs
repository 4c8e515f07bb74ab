//! Hazel Lab storefront client library.
//!
//! The client side of the Hazel Lab baking-supplies shop: a typed client for
//! the backend REST API, an explicit session store, an in-process notifier
//! that keeps independent cart consumers in sync, and the services and form
//! validation built on them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod notifier;
pub mod services;
pub mod state;
pub mod views;

pub use error::{Result, StorefrontError};
pub use state::AppState;
