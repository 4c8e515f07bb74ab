//! Hazel Lab Core - Shared domain types.
//!
//! This crate provides the types shared by every Hazel Lab component:
//! - `storefront` - Client-side application layer (API client, session, cart)
//! - `cli` - Command-line tools for RUT checks and scripted storefront access
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no global state. This keeps it lightweight and allows it to be
//! used anywhere, including in form validation that must never block.
//!
//! # Modules
//!
//! - [`types`] - RUT, email, ids, roles, prices and birth dates
//! - [`fmt`] - es-CL number grouping shared by RUT and price display

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod fmt;
pub mod types;

pub use types::*;
