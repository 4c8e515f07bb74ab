//! Application state shared across consumers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::models::SessionStore;
use crate::notifier::Notifier;
use crate::services::{
    AuthService, CartService, DashboardService, LocationService, UserService,
};
use crate::views::CartFragment;

/// Application state, built once at startup.
///
/// This struct is cheaply cloneable via `Arc` and replaces ambient globals:
/// every consumer receives the same notifier and session store through it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    notifier: Notifier,
    session: SessionStore,
    auth: AuthService,
    cart: CartService,
    users: UserService,
    dashboard: DashboardService,
    locations: LocationService,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("notifier", &self.inner.notifier)
            .field("logged_in", &self.inner.session.is_logged_in())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a new application state with an empty session and no subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let notifier = Notifier::new();
        let session = SessionStore::new();
        let auth = AuthService::new(api.clone(), session.clone(), notifier.clone());
        let cart = CartService::new(
            api.clone(),
            session.clone(),
            notifier.clone(),
            auth.clone(),
        );
        let users = UserService::new(api.clone(), session.clone(), auth.clone());
        let dashboard = DashboardService::new(api.clone(), session.clone(), auth.clone());
        let locations = LocationService::new(api.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                notifier,
                session,
                auth,
                cart,
                users,
                dashboard,
                locations,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    #[must_use]
    pub fn dashboard(&self) -> &DashboardService {
        &self.inner.dashboard
    }

    #[must_use]
    pub fn locations(&self) -> &LocationService {
        &self.inner.locations
    }

    /// Build a new independent cart consumer wired to this state.
    #[must_use]
    pub fn cart_fragment(&self, name: &'static str) -> CartFragment {
        CartFragment::new(
            name,
            self.inner.api.clone(),
            self.inner.session.clone(),
            &self.inner.notifier,
            self.inner.auth.clone(),
        )
    }
}
