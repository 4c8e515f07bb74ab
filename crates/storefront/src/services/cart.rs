//! Cart service.
//!
//! Owns the cart page's optimistic copy of the cart. Other consumers never
//! read this copy; they re-fetch when `CartChanged` is published.
//!
//! The copy belongs to the user it was loaded for. It is dropped whenever
//! `SessionChanged` is published, and a copy whose owner is no longer the
//! session user reads as empty.
//!
//! Mutations targeting the same line item run one at a time (a rapid
//! double-click on "+" issues two sequential updates, the second computed
//! from the first's result). Different lines proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info, instrument};

use hazel_lab_core::{CartItemId, ProductId, UserId};

use crate::api::ApiClient;
use crate::error::{Result, StorefrontError, add_breadcrumb};
use crate::models::{CartSnapshot, SessionStore};
use crate::notifier::{Notifier, Subscription, Topic};
use crate::services::AuthService;

/// Cart operations for the logged-in user.
#[derive(Clone)]
pub struct CartService {
    inner: Arc<CartServiceInner>,
}

struct CartServiceInner {
    api: ApiClient,
    session: SessionStore,
    notifier: Notifier,
    auth: AuthService,
    local: Arc<LocalCart>,
    _session_subscription: Subscription,
}

/// The cart page's copy and the per-line locks guarding its mutations.
#[derive(Default)]
struct LocalCart {
    copy: RwLock<OwnedSnapshot>,
    item_locks: Mutex<HashMap<CartItemId, Arc<tokio::sync::Mutex<()>>>>,
}

#[derive(Default)]
struct OwnedSnapshot {
    owner: Option<UserId>,
    cart: CartSnapshot,
}

impl LocalCart {
    fn reset(&self) {
        *self.copy.write().unwrap_or_else(PoisonError::into_inner) = OwnedSnapshot::default();
        self.item_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService")
            .field("lines", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

impl CartService {
    /// Create a new cart service with an empty local copy.
    ///
    /// The service subscribes to `SessionChanged` so that login, logout and
    /// session expiry discard the previous user's copy.
    #[must_use]
    pub fn new(api: ApiClient, session: SessionStore, notifier: Notifier, auth: AuthService) -> Self {
        let local = Arc::new(LocalCart::default());
        let handler_local = Arc::clone(&local);
        let session_subscription = notifier.subscribe(Topic::SessionChanged, move || {
            handler_local.reset();
            debug!("Session changed, cart copy dropped");
            Ok(())
        });

        Self {
            inner: Arc::new(CartServiceInner {
                api,
                session,
                notifier,
                auth,
                local,
                _session_subscription: session_subscription,
            }),
        }
    }

    /// The local copy as of the last load or successful mutation.
    ///
    /// Empty when nobody is logged in or the copy was loaded for another user.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        let current = self.inner.session.user_id();
        let copy = self
            .inner
            .local
            .copy
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if current.is_some() && copy.owner == current {
            copy.cart.clone()
        } else {
            CartSnapshot::default()
        }
    }

    fn replace_snapshot(&self, owner: Option<UserId>, cart: CartSnapshot) {
        *self
            .inner
            .local
            .copy
            .write()
            .unwrap_or_else(PoisonError::into_inner) = OwnedSnapshot { owner, cart };
    }

    /// Apply `edit` to the copy if it still belongs to `owner`.
    fn edit_snapshot(&self, owner: UserId, edit: impl FnOnce(&mut CartSnapshot)) {
        let mut copy = self
            .inner
            .local
            .copy
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if copy.owner == Some(owner) {
            edit(&mut copy.cart);
        }
    }

    fn require_user(&self) -> Result<UserId> {
        self.inner
            .session
            .user_id()
            .ok_or(StorefrontError::NotLoggedIn)
    }

    fn item_lock(&self, id: CartItemId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .inner
            .local
            .item_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }

    fn forget_item_lock(&self, id: CartItemId) {
        self.inner
            .local
            .item_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    fn current_quantity(&self, owner: UserId, id: CartItemId) -> Result<u32> {
        let copy = self
            .inner
            .local
            .copy
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        copy.owner
            .filter(|loaded_for| *loaded_for == owner)
            .and_then(|_| copy.cart.find(id))
            .map(|item| item.quantity)
            .ok_or_else(|| StorefrontError::NotFound(format!("cart item {id}")))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Re-fetch the cart from the backend, replacing the local copy.
    ///
    /// With no user logged in the local copy is cleared and returned empty.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` on 401, otherwise the API error.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<CartSnapshot> {
        let Some(user_id) = self.inner.session.user_id() else {
            self.replace_snapshot(None, CartSnapshot::default());
            return Ok(CartSnapshot::default());
        };

        let snapshot = self
            .inner
            .auth
            .guard(self.inner.api.cart_items(user_id).await)?;
        debug!(lines = snapshot.len(), "Cart loaded");
        if self.inner.session.user_id() == Some(user_id) {
            self.replace_snapshot(Some(user_id), snapshot.clone());
        }
        Ok(snapshot)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a product to the cart.
    ///
    /// The local copy is not touched; the cart page picks the new line up on
    /// its next load.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` for 0, `NotLoggedIn` without a session,
    /// `SessionExpired` on 401, otherwise the API error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(StorefrontError::InvalidQuantity(quantity));
        }
        let user_id = self.require_user()?;

        self.inner.auth.guard(
            self.inner
                .api
                .add_cart_item(user_id, product_id, quantity)
                .await,
        )?;

        add_breadcrumb(
            "cart",
            "Added product",
            Some(&[("product_id", &product_id.to_string())]),
        );
        info!(quantity, "Product added to cart");
        self.inner.notifier.publish(Topic::CartChanged);
        Ok(())
    }

    /// Add one unit to a line. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// `NotLoggedIn`, `NotFound` if the line is not in the local copy,
    /// `SessionExpired` on 401, otherwise the API error.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn increase(&self, item_id: CartItemId) -> Result<u32> {
        let user_id = self.require_user()?;
        let lock = self.item_lock(item_id);
        let _guard = lock.lock().await;

        let quantity = self.current_quantity(user_id, item_id)?.saturating_add(1);
        self.push_quantity(user_id, item_id, quantity).await?;
        Ok(quantity)
    }

    /// Remove one unit from a line. At quantity 1 this is a no-op; use
    /// [`CartService::remove`] to drop the line. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Same as [`CartService::increase`].
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn decrease(&self, item_id: CartItemId) -> Result<u32> {
        let user_id = self.require_user()?;
        let lock = self.item_lock(item_id);
        let _guard = lock.lock().await;

        let current = self.current_quantity(user_id, item_id)?;
        if current <= 1 {
            debug!("Quantity already at minimum");
            return Ok(current);
        }
        self.push_quantity(user_id, item_id, current - 1).await?;
        Ok(current - 1)
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` for 0, `NotLoggedIn` without a session,
    /// `SessionExpired` on 401, otherwise the API error.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn set_quantity(&self, item_id: CartItemId, quantity: u32) -> Result<u32> {
        if quantity == 0 {
            return Err(StorefrontError::InvalidQuantity(quantity));
        }
        let user_id = self.require_user()?;
        let lock = self.item_lock(item_id);
        let _guard = lock.lock().await;

        self.push_quantity(user_id, item_id, quantity).await?;
        Ok(quantity)
    }

    /// Drop a line from the cart.
    ///
    /// # Errors
    ///
    /// `NotLoggedIn` without a session, `SessionExpired` on 401, otherwise
    /// the API error.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove(&self, item_id: CartItemId) -> Result<()> {
        let user_id = self.require_user()?;
        let lock = self.item_lock(item_id);
        let _guard = lock.lock().await;

        self.inner
            .auth
            .guard(self.inner.api.remove_cart_item(item_id).await)?;

        self.edit_snapshot(user_id, |cart| {
            cart.remove(item_id);
        });
        self.forget_item_lock(item_id);
        info!("Cart line removed");
        self.inner.notifier.publish(Topic::CartChanged);
        Ok(())
    }

    /// Send a quantity update; on success apply it locally and publish.
    /// Callers hold the line's lock.
    async fn push_quantity(&self, owner: UserId, item_id: CartItemId, quantity: u32) -> Result<()> {
        self.inner.auth.guard(
            self.inner
                .api
                .update_cart_item_quantity(item_id, quantity)
                .await,
        )?;

        self.edit_snapshot(owner, |cart| {
            cart.set_quantity(item_id, quantity);
        });
        info!(quantity, "Cart quantity updated");
        self.inner.notifier.publish(Topic::CartChanged);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;

    fn service() -> (CartService, Notifier) {
        let config = StorefrontConfig::for_api_url("http://127.0.0.1:9/api").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let session = SessionStore::new();
        let notifier = Notifier::new();
        let auth = AuthService::new(api.clone(), session.clone(), notifier.clone());
        (CartService::new(api, session, notifier.clone(), auth), notifier)
    }

    #[tokio::test]
    async fn test_mutations_require_login_before_any_call() {
        let (cart, notifier) = service();
        let published = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        let _sub = notifier.subscribe(Topic::CartChanged, move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });

        let item = CartItemId::new(1);
        assert!(matches!(
            cart.add_product(ProductId::new(1), 1).await,
            Err(StorefrontError::NotLoggedIn)
        ));
        assert!(matches!(cart.increase(item).await, Err(StorefrontError::NotLoggedIn)));
        assert!(matches!(cart.decrease(item).await, Err(StorefrontError::NotLoggedIn)));
        assert!(matches!(
            cart.set_quantity(item, 2).await,
            Err(StorefrontError::NotLoggedIn)
        ));
        assert!(matches!(cart.remove(item).await, Err(StorefrontError::NotLoggedIn)));

        assert_eq!(published.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let (cart, _) = service();
        assert!(matches!(
            cart.add_product(ProductId::new(1), 0).await,
            Err(StorefrontError::InvalidQuantity(0))
        ));
        assert!(matches!(
            cart.set_quantity(CartItemId::new(1), 0).await,
            Err(StorefrontError::InvalidQuantity(0))
        ));
    }

    #[tokio::test]
    async fn test_load_without_session_is_empty() {
        let (cart, _) = service();
        assert!(cart.load().await.unwrap().is_empty());
        assert!(cart.snapshot().is_empty());
    }

    fn loaded_copy(cart: &CartService, owner: i64) {
        let snapshot: CartSnapshot = serde_json::from_value(serde_json::json!([
            { "id": 40, "quantity": 2, "producto": null }
        ]))
        .unwrap();
        cart.replace_snapshot(Some(UserId::new(owner)), snapshot);
        let _ = cart.item_lock(CartItemId::new(40));
    }

    fn sign_in(cart: &CartService, id: i64) {
        cart.inner.session.set(crate::models::CurrentUser {
            id: UserId::new(id),
            username: format!("user{id}"),
            email: hazel_lab_core::Email::parse("user@duoc.cl").unwrap(),
            role: hazel_lab_core::Role::Customer,
            status: hazel_lab_core::AccountStatus::Active,
        });
    }

    #[test]
    fn test_session_change_drops_local_copy() {
        let (cart, notifier) = service();
        sign_in(&cart, 1);
        loaded_copy(&cart, 1);
        assert_eq!(cart.snapshot().len(), 1);

        notifier.publish(Topic::SessionChanged);

        assert!(cart.snapshot().is_empty());
        assert!(cart.inner.local.item_locks.lock().unwrap().is_empty());
        assert!(matches!(
            cart.current_quantity(UserId::new(1), CartItemId::new(40)),
            Err(StorefrontError::NotFound(_))
        ));
    }

    #[test]
    fn test_copy_of_another_user_reads_as_empty() {
        let (cart, _) = service();
        loaded_copy(&cart, 1);
        sign_in(&cart, 2);

        assert!(cart.snapshot().is_empty());
        assert!(matches!(
            cart.current_quantity(UserId::new(2), CartItemId::new(40)),
            Err(StorefrontError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_increase_on_foreign_copy_sends_nothing() {
        // The backend address is unreachable, so a sent request would be an Api error.
        let (cart, _) = service();
        loaded_copy(&cart, 1);
        sign_in(&cart, 2);

        assert!(matches!(
            cart.increase(CartItemId::new(40)).await,
            Err(StorefrontError::NotFound(_))
        ));
    }

    #[test]
    fn test_item_locks_are_shared_per_line() {
        let (cart, _) = service();
        let a = cart.item_lock(CartItemId::new(1));
        let b = cart.item_lock(CartItemId::new(1));
        let c = cart.item_lock(CartItemId::new(2));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        cart.forget_item_lock(CartItemId::new(1));
        assert!(!Arc::ptr_eq(&a, &cart.item_lock(CartItemId::new(1))));
    }
}
