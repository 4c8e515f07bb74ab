//! Command implementations.

pub mod cart;
pub mod products;
pub mod rut;

use thiserror::Error;

use hazel_lab_core::RutError;
use hazel_lab_storefront::api::ApiError;
use hazel_lab_storefront::config::{ConfigError, StorefrontConfig};
use hazel_lab_storefront::{AppState, StorefrontError};

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A storefront operation failed.
    #[error("{}", .0.user_message())]
    Storefront(#[from] StorefrontError),

    /// The RUT given on the command line is invalid.
    #[error("Invalid RUT: {0}")]
    Rut(#[from] RutError),
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        Self::Storefront(err.into())
    }
}

impl CliError {
    /// Process exit code: 1 for rejected input, 2 for everything else.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Rut(_) | Self::Storefront(StorefrontError::Validation(_)) => 1,
            _ => 2,
        }
    }

    /// Log the failure, sending unexpected ones to Sentry.
    pub fn report(&self) {
        match self {
            Self::Storefront(err) => err.report(),
            Self::Config(err) => tracing::error!(error = %err, "Configuration error"),
            Self::Rut(_) => {}
        }
    }
}

/// Build application state from the environment.
pub(crate) fn app_state(config: StorefrontConfig) -> Result<AppState, CliError> {
    Ok(AppState::new(config)?)
}
