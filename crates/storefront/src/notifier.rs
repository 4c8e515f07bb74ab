//! In-process publish/subscribe for shared-state invalidation.
//!
//! Independent consumers (navbar cart badge, mini-cart, cart page) each keep
//! their own cached view of remote state. When a component mutates that state
//! through the backend it publishes a [`Topic`]; every subscriber then
//! re-fetches on its own. Notifications carry no payload, so a consumer can
//! never act on a stale inline copy.
//!
//! # Semantics
//!
//! 1. Handlers run synchronously on the publishing thread, in registration order.
//! 2. A handler that returns an error or panics is logged and skipped; the
//!    remaining handlers still run and the publisher never sees the failure.
//! 3. A handler unsubscribed during a publish round is not invoked later in
//!    that round. A handler subscribed during a round first runs on the next
//!    publish.
//! 4. Unsubscribing is idempotent.
//! 5. Dropping a [`Subscription`] unsubscribes it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use hazel_lab_storefront::notifier::{Notifier, Topic};
//!
//! let notifier = Notifier::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&hits);
//! let subscription = notifier.subscribe(Topic::CartChanged, move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! notifier.publish(Topic::CartChanged);
//! notifier.publish(Topic::SessionChanged);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! drop(subscription);
//! notifier.publish(Topic::CartChanged);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, error, warn};

/// Error type a handler may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by handlers.
pub type HandlerResult = Result<(), HandlerError>;

type Handler = Arc<dyn Fn() -> HandlerResult + Send + Sync>;

/// Named notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Cart contents changed (item added, quantity updated, item removed).
    CartChanged,
    /// A user logged in or out, or the session expired.
    SessionChanged,
}

impl Topic {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CartChanged => "cart-changed",
            Self::SessionChanged => "session-changed",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one registration with a [`Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one [`Notifier::publish`] round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handlers that were called.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

impl PublishReport {
    /// Whether every invoked handler succeeded.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

struct Entry {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Kept in registration order.
    entries: Vec<Entry>,
}

impl Registry {
    fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // Handlers never run while the lock is held, so poisoning can only come
    // from a panic inside this module's own bookkeeping.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide publish/subscribe hub.
///
/// Construct one at startup and clone it into every consumer; clones share
/// the same subscriber set.
#[derive(Clone, Default)]
pub struct Notifier {
    registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("cart_changed", &self.subscriber_count(Topic::CartChanged))
            .field("session_changed", &self.subscriber_count(Topic::SessionChanged))
            .finish()
    }
}

impl Notifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every future publish on `topic`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// dropped or unsubscribed, or [`Notifier::unsubscribe`] is called with
    /// its id.
    #[must_use = "dropping the Subscription unsubscribes immediately; call detach() to keep it"]
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry.entries.push(Entry {
            id,
            topic,
            handler: Arc::new(handler),
        });
        drop(registry);

        debug!(topic = %topic, subscription = %id, "Subscribed");

        Subscription {
            id,
            topic,
            registry: Arc::downgrade(&self.registry),
            active: true,
        }
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = lock(&self.registry).remove(id);
        if removed {
            debug!(subscription = %id, "Unsubscribed");
        }
        removed
    }

    /// Invoke every handler registered for `topic`, in registration order.
    ///
    /// Handler failures are logged and counted in the report, never returned.
    pub fn publish(&self, topic: Topic) -> PublishReport {
        let round: Vec<(SubscriptionId, Handler)> = lock(&self.registry)
            .entries
            .iter()
            .filter(|e| e.topic == topic)
            .map(|e| (e.id, Arc::clone(&e.handler)))
            .collect();

        debug!(topic = %topic, subscribers = round.len(), "Publishing");

        let mut report = PublishReport::default();
        for (id, handler) in round {
            // An earlier handler in this round may have unsubscribed this one.
            if !lock(&self.registry).contains(id) {
                continue;
            }

            report.invoked += 1;
            match catch_unwind(AssertUnwindSafe(|| handler())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(
                        topic = %topic,
                        subscription = %id,
                        error = %e,
                        "Notification handler failed"
                    );
                }
                Err(payload) => {
                    report.failed += 1;
                    error!(
                        topic = %topic,
                        subscription = %id,
                        panic = %panic_message(payload.as_ref()),
                        "Notification handler panicked"
                    );
                }
            }
        }

        report
    }

    /// Number of handlers currently registered for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        lock(&self.registry)
            .entries
            .iter()
            .filter(|e| e.topic == topic)
            .count()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Handle to a registered handler.
///
/// Dropping the handle unsubscribes, which ties a handler's lifetime to the
/// component that owns it. Use [`Subscription::detach`] for handlers that
/// should live as long as the notifier.
pub struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    registry: Weak<Mutex<Registry>>,
    active: bool,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("active", &self.active)
            .finish()
    }
}

impl Subscription {
    /// The registration id, usable with [`Notifier::unsubscribe`].
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The topic this subscription listens to.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// Remove the handler now. Safe to call after the notifier itself
    /// already dropped the registration.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the handler registered for the notifier's lifetime.
    pub fn detach(mut self) -> SubscriptionId {
        self.active = false;
        self.id
    }

    fn release(&mut self) {
        if !std::mem::replace(&mut self.active, false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade()
            && lock(&registry).remove(self.id)
        {
            debug!(topic = %self.topic, subscription = %self.id, "Unsubscribed on drop");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
