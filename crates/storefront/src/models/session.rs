//! Session state: who is logged in.
//!
//! [`SessionStore`] is an injectable container rather than ambient global
//! storage. It performs no notification itself; the auth service is its only
//! writer and publishes `SessionChanged` after every mutation.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use hazel_lab_core::{AccountStatus, Capability, Email, Role, UserId};

use super::User;

/// Session-stored user identity.
///
/// Minimal data kept for the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: Role,
    pub status: AccountStatus,
}

impl CurrentUser {
    /// Advisory permission check. The backend remains the authority.
    #[must_use]
    pub const fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            status: user.status,
        }
    }
}

/// Shared holder for the current session.
///
/// Cheap to clone; clones see the same session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<CurrentUser>>>,
}

impl SessionStore {
    /// An empty (logged-out) session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current user, if any.
    #[must_use]
    pub fn get(&self) -> Option<CurrentUser> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|user| user.id)
    }

    /// Replace the current user.
    pub fn set(&self, user: CurrentUser) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    /// Remove the current user, returning who was logged in.
    pub fn clear(&self) -> Option<CurrentUser> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
