//! Admin user management.
//!
//! Role gates here are advisory: they keep the admin screens from issuing
//! requests the backend would refuse. The backend remains the authority.

use tracing::{info, instrument};

use hazel_lab_core::birth_date::today;
use hazel_lab_core::{Capability, UserId};

use crate::api::{ApiClient, UserFilter};
use crate::error::{Result, StorefrontError};
use crate::forms::UserForm;
use crate::models::{SessionStore, User};
use crate::services::AuthService;

/// CRUD over `/usuarios` for staff.
#[derive(Debug, Clone)]
pub struct UserService {
    api: ApiClient,
    session: SessionStore,
    auth: AuthService,
}

impl UserService {
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionStore, auth: AuthService) -> Self {
        Self { api, session, auth }
    }

    fn authorize(&self) -> Result<()> {
        let user = self.session.get().ok_or(StorefrontError::NotLoggedIn)?;
        if user.can(Capability::ManageUsers) {
            Ok(())
        } else {
            Err(StorefrontError::Forbidden(Capability::ManageUsers))
        }
    }

    /// List every account.
    ///
    /// # Errors
    ///
    /// `NotLoggedIn`/`Forbidden` before any call, `SessionExpired` on 401,
    /// otherwise the API error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>> {
        self.authorize()?;
        self.auth.guard(self.api.users().await)
    }

    /// Accounts matching every set field of `filter`.
    ///
    /// # Errors
    ///
    /// As [`UserService::list`].
    #[instrument(skip(self))]
    pub async fn search(&self, filter: &UserFilter) -> Result<Vec<User>> {
        self.authorize()?;
        self.auth.guard(self.api.search_users(filter).await)
    }

    /// Fetch one account.
    ///
    /// # Errors
    ///
    /// `NotFound` if the backend has no such user; otherwise as [`UserService::list`].
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: UserId) -> Result<User> {
        self.authorize()?;
        match self.api.user(id).await {
            Err(err) if err.is_not_found() => Err(StorefrontError::NotFound(format!("user {id}"))),
            result => self.auth.guard(result),
        }
    }

    /// Validate and create an account.
    ///
    /// # Errors
    ///
    /// `Validation` if the form fails local checks (nothing is sent);
    /// otherwise as [`UserService::list`].
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn create(&self, form: UserForm) -> Result<User> {
        self.authorize()?;
        let new_user = form.validate_new_on(today())?;
        let user = self.auth.guard(self.api.create_user(&new_user).await)?;
        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Validate and update an account. The password is only sent when the
    /// form carries a new one.
    ///
    /// # Errors
    ///
    /// As [`UserService::create`].
    #[instrument(skip(self, form), fields(user_id = %id))]
    pub async fn update(&self, id: UserId, form: UserForm) -> Result<User> {
        self.authorize()?;
        let update = form.validate_update_on(today())?;
        let user = self.auth.guard(self.api.update_user(id, &update).await)?;
        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// As [`UserService::list`].
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: UserId) -> Result<()> {
        self.authorize()?;
        self.auth.guard(self.api.delete_user(id).await)?;
        info!("User deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::models::CurrentUser;
    use crate::notifier::Notifier;
    use hazel_lab_core::{AccountStatus, Email, Role};

    fn service(role: Option<Role>) -> UserService {
        let config = StorefrontConfig::for_api_url("http://127.0.0.1:9/api").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let session = SessionStore::new();
        if let Some(role) = role {
            session.set(CurrentUser {
                id: UserId::new(1),
                username: "staff".to_string(),
                email: Email::parse("staff@duoc.cl").unwrap(),
                role,
                status: AccountStatus::Active,
            });
        }
        let auth = AuthService::new(api.clone(), session.clone(), Notifier::new());
        UserService::new(api, session, auth)
    }

    #[tokio::test]
    async fn test_requires_login() {
        let users = service(None);
        assert!(matches!(users.list().await, Err(StorefrontError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_customers_and_sellers_are_forbidden() {
        for role in [Role::Customer, Role::Seller] {
            let users = service(Some(role));
            assert!(matches!(
                users.delete(UserId::new(2)).await,
                Err(StorefrontError::Forbidden(Capability::ManageUsers))
            ));
        }
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        // The backend address is unreachable, so reaching it would be an Api error.
        let users = service(Some(Role::Admin));
        let result = users.create(UserForm::default()).await;
        assert!(matches!(result, Err(StorefrontError::Validation(_))));
    }
}
