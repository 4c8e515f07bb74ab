//! Integration tests for the Hazel Lab storefront layer.
//!
//! Every test runs the real [`AppState`] against a [`wiremock`] server that
//! stands in for the REST backend, so no external services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hazel-lab-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - endpoint paths, caching, error mapping
//! - `auth` - login, logout, registration, session expiry
//! - `cart_service` - cart mutations and change notifications
//! - `cart_fragment` - independent cart views refreshing on change
//! - `users` - admin user management

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use wiremock::MockServer;

use hazel_lab_core::{AccountStatus, Email, Role, UserId};
use hazel_lab_storefront::AppState;
use hazel_lab_storefront::config::StorefrontConfig;
use hazel_lab_storefront::models::CurrentUser;
use hazel_lab_storefront::notifier::{Notifier, Subscription, Topic};

/// A mock backend plus application state wired to it.
pub struct TestContext {
    pub server: MockServer,
    pub state: AppState,
}

impl TestContext {
    /// Start a mock backend and build state pointing at its `/api` root.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid base URL.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let config = StorefrontConfig::for_api_url(&format!("{}/api", server.uri()))
            .expect("mock server URI is a valid API URL");
        let state = AppState::new(config).expect("HTTP client builds");
        Self { server, state }
    }

    /// Put a user in the session without going through the backend.
    ///
    /// Nothing is published; tests that care about notifications log in
    /// through [`hazel_lab_storefront::services::AuthService::login`].
    pub fn sign_in(&self, id: i64, role: Role) -> CurrentUser {
        let user = CurrentUser {
            id: UserId::new(id),
            username: format!("user{id}"),
            email: Email::parse(&format!("user{id}@duoc.cl")).expect("valid email"),
            role,
            status: AccountStatus::Active,
        };
        self.state.session().set(user.clone());
        user
    }
}

/// Counts how many times a topic was published.
pub struct PublishCounter {
    count: Arc<AtomicUsize>,
    _subscription: Subscription,
}

impl PublishCounter {
    /// Subscribe a counter to `topic`.
    #[must_use]
    pub fn new(notifier: &Notifier, topic: Topic) -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let handler_count = Arc::clone(&count);
        let subscription = notifier.subscribe(topic, move || {
            handler_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        Self {
            count,
            _subscription: subscription,
        }
    }

    /// Publishes seen so far.
    #[must_use]
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Backend fixtures
// =============================================================================

/// A user record as the backend returns it.
#[must_use]
pub fn user_json(id: i64, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "username": "Ana Pérez",
        "email": email,
        "rut": "12.345.678-5",
        "role": role,
        "status": "activo",
        "nombre": "Ana",
        "apellidos": "Pérez",
        "region": "Metropolitana",
        "comuna": "Providencia",
        "direccion": "Av. Siempre Viva 742",
        "fechaNacimiento": "1995-04-12"
    })
}

/// A product record as the backend returns it.
#[must_use]
pub fn product_json(id: i64, name: &str, cost: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "Insumo de repostería",
        "cost": cost,
        "stock": 25,
        "stockCritico": 5,
        "destacado": false,
        "activeStatus": true,
        "category": { "id": 1, "nombre": "Chocolates" }
    })
}

/// A cart line as the backend returns it.
#[must_use]
pub fn cart_item_json(id: i64, quantity: u32, product: Option<(i64, &str, i64)>) -> Value {
    let producto = product.map_or(Value::Null, |(product_id, name, cost)| {
        json!({ "id": product_id, "name": name, "cost": cost })
    });
    json!({
        "id": id,
        "usuario": { "id": 1 },
        "producto": producto,
        "quantity": quantity
    })
}
