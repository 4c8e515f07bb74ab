//! Unified error handling with Sentry integration.
//!
//! Services return `Result<T, StorefrontError>`. Front ends show
//! [`StorefrontError::user_message`] to the user and call
//! [`StorefrontError::report`] so unexpected failures reach Sentry.

use thiserror::Error;

use hazel_lab_core::Capability;

use crate::api::ApiError;
use crate::forms::FieldErrors;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local form validation failed; nothing was sent to the backend.
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// Backend rejected the email/password pair.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The operation needs a logged-in user.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The backend answered 401; the local session was cleared.
    #[error("Session expired")]
    SessionExpired,

    /// The current role lacks a capability.
    #[error("Forbidden: requires {0:?}")]
    Forbidden(Capability),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered 2xx with unusable data.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A cart quantity below 1.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
}

impl StorefrontError {
    /// Message suitable for an alert or inline banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            Self::Api(err) if err.is_unauthorized() => {
                "Your session has expired. Please log in again.".to_string()
            }
            Self::NotLoggedIn => "Please log in to continue.".to_string(),
            Self::NotFound(_) => "The requested item was not found.".to_string(),
            Self::Api(err) if err.is_not_found() => "The requested item was not found.".to_string(),
            Self::Forbidden(_) => "You don't have permission to do that.".to_string(),
            Self::Api(err) if err.is_forbidden() => {
                "You don't have permission to do that.".to_string()
            }
            Self::Validation(errors) => errors.to_string(),
            Self::InvalidCredentials(message) if !message.is_empty() => message.clone(),
            Self::InvalidCredentials(_) => "Invalid email or password.".to_string(),
            Self::InvalidQuantity(_) => "Quantity must be at least 1.".to_string(),
            Self::Api(ApiError::Http { .. }) => {
                "Could not reach the store. Check your connection and try again.".to_string()
            }
            // Backend business errors (e.g. "Stock insuficiente") are meant for users
            Self::Api(err @ ApiError::Status { status, .. }) if status.is_client_error() => err
                .backend_message()
                .map_or_else(|| "The request was rejected.".to_string(), str::to_owned),
            Self::Api(_) | Self::InvalidResponse(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Whether the failure is unexpected and worth an error report.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        match self {
            Self::Api(ApiError::Status { status, .. }) => status.is_server_error(),
            Self::Api(_) | Self::InvalidResponse(_) => true,
            _ => false,
        }
    }

    /// Log the error and capture unexpected ones to Sentry.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::info!(error = %self, "Storefront operation rejected");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
