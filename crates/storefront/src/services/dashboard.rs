//! Admin dashboard figures, for staff who may view them.

use tracing::instrument;

use hazel_lab_core::Capability;

use crate::api::ApiClient;
use crate::error::{Result, StorefrontError};
use crate::models::{BestSeller, DashboardStats, SessionStore};
use crate::services::AuthService;

#[derive(Debug, Clone)]
pub struct DashboardService {
    api: ApiClient,
    session: SessionStore,
    auth: AuthService,
}

impl DashboardService {
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionStore, auth: AuthService) -> Self {
        Self { api, session, auth }
    }

    fn authorize(&self) -> Result<()> {
        let user = self.session.get().ok_or(StorefrontError::NotLoggedIn)?;
        if user.can(Capability::ViewDashboard) {
            Ok(())
        } else {
            Err(StorefrontError::Forbidden(Capability::ViewDashboard))
        }
    }

    /// Headline figures.
    ///
    /// # Errors
    ///
    /// `NotLoggedIn`/`Forbidden` before any call, `SessionExpired` on 401,
    /// otherwise the API error.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats> {
        self.authorize()?;
        self.auth.guard(self.api.dashboard_stats().await)
    }

    /// Best-selling products, in the backend's order.
    ///
    /// # Errors
    ///
    /// As [`DashboardService::stats`].
    #[instrument(skip(self))]
    pub async fn best_sellers(&self) -> Result<Vec<BestSeller>> {
        self.authorize()?;
        self.auth.guard(self.api.best_sellers().await)
    }
}
