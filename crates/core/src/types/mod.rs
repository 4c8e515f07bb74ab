//! Core types for Hazel Lab.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod birth_date;
pub mod email;
pub mod id;
pub mod price;
pub mod rut;
pub mod status;

pub use birth_date::{MIN_ADULT_AGE, age_on, is_adult_on};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use rut::{NormalizedRut, Rut, RutError};
pub use status::*;
