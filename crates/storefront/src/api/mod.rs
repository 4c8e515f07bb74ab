//! Backend REST API client.
//!
//! # Architecture
//!
//! - JSON over `reqwest`, base URL from [`StorefrontConfig`](crate::config::StorefrontConfig)
//! - The backend is the source of truth; nothing is persisted locally
//! - Catalog listings (products, featured products, categories) and the
//!   region list are cached in memory with `moka`; product mutations
//!   invalidate the product listings
//! - Searches, cart, user, dashboard and login calls are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use hazel_lab_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! let featured = client.featured_products().await?;
//! let cart = client.cart_items(user_id).await?;
//! client.update_cart_item_quantity(cart.items()[0].id, 3).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: StatusCode,
        /// Backend-provided error text.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status, if the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The session is no longer valid on the backend.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Backend-provided message for non-2xx responses.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Extract a human-readable message from an error body.
///
/// The backend answers either with `{"message": ...}` / `{"error": ...}`
/// JSON or with plain text.
pub(crate) fn extract_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Object(map) => ["message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(|v| v.as_str()).map(str::to_owned)),
            _ => None,
        });

    from_json.unwrap_or_else(|| body.trim().chars().take(200).collect())
}
