//! Cart presentation.
//!
//! [`CartView`] is display-ready cart data. [`CartFragment`] is one
//! independent consumer of the cart (navbar badge, mini-cart, cart page): it
//! keeps its own cached view, marks it stale whenever `CartChanged` or
//! `SessionChanged` is published, and re-fetches from the backend on the next
//! read. Fragments never look at each other's caches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, instrument};

use hazel_lab_core::{CartItemId, Price, ProductId};

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{CartItem, CartSnapshot, SessionStore};
use crate::notifier::{Notifier, Subscription, Topic};
use crate::services::AuthService;

/// Shown for lines whose product no longer exists.
const MISSING_PRODUCT_NAME: &str = "Unnamed product";

// =============================================================================
// View Types
// =============================================================================

/// One cart line, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: CartItemId,
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity: u32,
    /// Unit price, e.g. `$2.500`.
    pub price: String,
    /// Unit price times quantity.
    pub line_price: String,
    /// The "-" button is disabled at quantity 1.
    pub can_decrease: bool,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Total units, for the navbar badge.
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Price::ZERO.display(),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for CartView {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartSnapshot> for CartView {
    fn from(cart: &CartSnapshot) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.total().display(),
            item_count: cart.item_count(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product.as_ref().map(|p| p.id),
            name: item
                .product
                .as_ref()
                .map_or_else(|| MISSING_PRODUCT_NAME.to_string(), |p| p.name.clone()),
            quantity: item.quantity,
            price: item.unit_price().display(),
            line_price: item.line_total().display(),
            can_decrease: item.quantity > 1,
        }
    }
}

// =============================================================================
// CartFragment
// =============================================================================

struct FragmentState {
    name: &'static str,
    stale: AtomicBool,
    last_good: Mutex<CartView>,
}

impl FragmentState {
    fn mark_stale(&self, topic: Topic) {
        if !self.stale.swap(true, Ordering::SeqCst) {
            debug!(fragment = self.name, topic = %topic, "Cart fragment marked stale");
        }
    }
}

/// An independent cart consumer.
///
/// Subscribes on construction; dropping the fragment unsubscribes.
pub struct CartFragment {
    api: ApiClient,
    session: SessionStore,
    auth: AuthService,
    state: Arc<FragmentState>,
    _subscriptions: [Subscription; 2],
}

impl std::fmt::Debug for CartFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartFragment")
            .field("name", &self.state.name)
            .field("stale", &self.is_stale())
            .finish_non_exhaustive()
    }
}

impl CartFragment {
    /// Create a fragment and subscribe it to cart and session changes.
    ///
    /// The fragment starts stale, so the first read fetches.
    #[must_use]
    pub fn new(
        name: &'static str,
        api: ApiClient,
        session: SessionStore,
        notifier: &Notifier,
        auth: AuthService,
    ) -> Self {
        let state = Arc::new(FragmentState {
            name,
            stale: AtomicBool::new(true),
            last_good: Mutex::new(CartView::empty()),
        });

        let subscriptions = [Topic::CartChanged, Topic::SessionChanged].map(|topic| {
            let state = Arc::clone(&state);
            notifier.subscribe(topic, move || {
                state.mark_stale(topic);
                Ok(())
            })
        });

        Self {
            api,
            session,
            auth,
            state,
            _subscriptions: subscriptions,
        }
    }

    /// Whether the next [`CartFragment::view`] will hit the backend.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state.stale.load(Ordering::SeqCst)
    }

    /// The last successfully fetched view, without fetching.
    #[must_use]
    pub fn cached_view(&self) -> CartView {
        self.state
            .last_good
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, view: CartView) {
        *self
            .state
            .last_good
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = view;
    }

    /// Current cart view, re-fetching first if a change was published since
    /// the last read. Logged-out users see an empty cart.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the last good view is kept and the fragment
    /// stays stale so the next read retries.
    #[instrument(skip(self), fields(fragment = self.state.name))]
    pub async fn view(&self) -> Result<CartView> {
        if !self.state.stale.swap(false, Ordering::SeqCst) {
            return Ok(self.cached_view());
        }

        let Some(user_id) = self.session.user_id() else {
            let view = CartView::empty();
            self.store(view.clone());
            return Ok(view);
        };

        match self.auth.guard(self.api.cart_items(user_id).await) {
            Ok(snapshot) => {
                let view = CartView::from(&snapshot);
                debug!(lines = view.items.len(), "Cart fragment refreshed");
                self.store(view.clone());
                Ok(view)
            }
            Err(err) => {
                self.state.stale.store(true, Ordering::SeqCst);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use serde_json::json;

    fn snapshot() -> CartSnapshot {
        serde_json::from_value(json!([
            { "id": 1, "quantity": 2, "producto": { "id": 7, "name": "Chips de chocolate", "cost": 3490 } },
            { "id": 2, "quantity": 1, "producto": null }
        ]))
        .unwrap()
    }

    #[test]
    fn test_cart_view_from_snapshot() {
        let view = CartView::from(&snapshot());
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$6.980");

        let first = &view.items[0];
        assert_eq!(first.name, "Chips de chocolate");
        assert_eq!(first.price, "$3.490");
        assert_eq!(first.line_price, "$6.980");
        assert!(first.can_decrease);

        let orphan = &view.items[1];
        assert_eq!(orphan.name, MISSING_PRODUCT_NAME);
        assert_eq!(orphan.product_id, None);
        assert_eq!(orphan.line_price, "$0");
        assert!(!orphan.can_decrease);
    }

    #[test]
    fn test_empty_view() {
        let view = CartView::empty();
        assert!(view.is_empty());
        assert_eq!(view.subtotal, "$0");
        assert_eq!(view, CartView::from(&CartSnapshot::default()));
    }

    fn fragment(notifier: &Notifier) -> CartFragment {
        let config = StorefrontConfig::for_api_url("http://127.0.0.1:9/api").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let session = SessionStore::new();
        let auth = AuthService::new(api.clone(), session.clone(), notifier.clone());
        CartFragment::new("navbar-badge", api, session, notifier, auth)
    }

    #[tokio::test]
    async fn test_fragment_goes_stale_on_publish() {
        let notifier = Notifier::new();
        let badge = fragment(&notifier);
        assert!(badge.is_stale());

        // Logged out: an empty view without a backend call.
        assert!(badge.view().await.unwrap().is_empty());
        assert!(!badge.is_stale());

        notifier.publish(Topic::CartChanged);
        assert!(badge.is_stale());
        badge.view().await.unwrap();

        notifier.publish(Topic::SessionChanged);
        assert!(badge.is_stale());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let notifier = Notifier::new();
        let badge = fragment(&notifier);
        assert_eq!(notifier.subscriber_count(Topic::CartChanged), 1);
        assert_eq!(notifier.subscriber_count(Topic::SessionChanged), 1);

        drop(badge);
        assert_eq!(notifier.subscriber_count(Topic::CartChanged), 0);
        assert_eq!(notifier.subscriber_count(Topic::SessionChanged), 0);
    }
}
