//! Business logic services for the storefront client.
//!
//! # Services
//!
//! - `auth` - Login, logout, session expiry and self-service registration
//! - `cart` - Cart mutations, serialized per line item
//! - `dashboard` - Admin dashboard figures
//! - `location` - Region and commune lookups with offline fallbacks
//! - `users` - Admin user management and search
//!
//! The API client, the session store and the notifier are shared through
//! [`AppState`](crate::state::AppState); the only state a service owns is the
//! cart page's local copy in `cart`.
//! Every successful mutation of shared state is followed by a publish.

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod location;
pub mod users;

pub use auth::AuthService;
pub use cart::CartService;
pub use dashboard::DashboardService;
pub use location::LocationService;
pub use users::UserService;
