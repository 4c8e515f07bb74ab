//! Authentication service.
//!
//! The only writer of the [`SessionStore`]. Every session mutation is
//! followed by a `SessionChanged` publish.

use secrecy::SecretString;
use tracing::{info, instrument, warn};

use hazel_lab_core::AccountStatus;

use crate::api::{ApiClient, ApiError};
use crate::error::{Result, StorefrontError, clear_sentry_user, set_sentry_user};
use crate::forms::{LoginForm, RegistrationForm};
use crate::models::{CurrentUser, SessionStore, User};
use crate::notifier::{Notifier, Topic};

/// Authentication service.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionStore,
    notifier: Notifier,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionStore, notifier: Notifier) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.session.get()
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// - `Validation` if the email is not allow-listed or the password is too short
    /// - `InvalidCredentials` if the backend rejects the pair or the account is inactive
    /// - `InvalidResponse` if the backend's user record lacks an id or email
    /// - `Api` for transport and server failures
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: SecretString) -> Result<CurrentUser> {
        let form = LoginForm::new(email, password);
        let email = form.validate()?;

        let user = match self.api.login(email.as_str(), &form.password).await {
            Ok(user) => user,
            Err(ApiError::Decode { source, .. }) => {
                return Err(StorefrontError::InvalidResponse(format!(
                    "login response is not a user record: {source}"
                )));
            }
            Err(err @ ApiError::Status { status, .. }) if status.is_client_error() => {
                return Err(StorefrontError::InvalidCredentials(
                    err.backend_message().unwrap_or_default().to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        if user.email.as_str().trim().is_empty() {
            return Err(StorefrontError::InvalidResponse(
                "login response has an empty email".to_string(),
            ));
        }
        if user.status == AccountStatus::Inactive {
            return Err(StorefrontError::InvalidCredentials(
                "This account is inactive".to_string(),
            ));
        }

        Ok(self.start_session(user))
    }

    /// Log out the current user. Returns who was logged in.
    pub fn logout(&self) -> Option<CurrentUser> {
        let previous = self.end_session();
        if let Some(user) = &previous {
            info!(user_id = %user.id, "User logged out");
        }
        previous
    }

    /// End the session after the backend answered 401.
    pub fn expire(&self) -> Option<CurrentUser> {
        let previous = self.end_session();
        warn!(
            user_id = ?previous.as_ref().map(|u| u.id),
            "Session expired, re-authentication required"
        );
        previous
    }

    /// Map a 401 to [`StorefrontError::SessionExpired`], clearing the session.
    ///
    /// # Errors
    ///
    /// Passes other API errors through.
    pub fn guard<T>(&self, result: std::result::Result<T, ApiError>) -> Result<T> {
        match result {
            Err(err) if err.is_unauthorized() => {
                self.expire();
                Err(StorefrontError::SessionExpired)
            }
            other => other.map_err(StorefrontError::from),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create a customer account and log it in.
    ///
    /// # Errors
    ///
    /// - `Validation` if the form fails local checks (nothing is sent)
    /// - `Api` if the backend rejects the account (e.g. duplicate email)
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: RegistrationForm) -> Result<CurrentUser> {
        let new_user = form.validate()?;
        let user = self.api.create_user(&new_user).await?;
        info!(user_id = %user.id, "Account registered");
        Ok(self.start_session(user))
    }

    // =========================================================================
    // Session bookkeeping
    // =========================================================================

    fn start_session(&self, user: User) -> CurrentUser {
        let current = CurrentUser::from(user);
        self.session.set(current.clone());
        self.notifier.publish(Topic::SessionChanged);
        set_sentry_user(&current.id, Some(current.email.as_str()));
        info!(user_id = %current.id, role = %current.role, "User logged in");
        current
    }

    fn end_session(&self) -> Option<CurrentUser> {
        let previous = self.session.clear();
        self.notifier.publish(Topic::SessionChanged);
        clear_sentry_user();
        previous
    }
}
