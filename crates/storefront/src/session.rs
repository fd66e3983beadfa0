//! Session transitions and cart reconciliation.
//!
//! Login, registration, logout, and profile refresh all change (or refresh)
//! the authenticated identity, so each one reconciles the active cart,
//! shipping address, and payment method slots against the per-user
//! snapshots before the cart store resyncs.
//!
//! Reconciliation priority, applied independently per slot:
//! user snapshot > anonymous snapshot > empty. One side fully wins; two
//! non-empty carts are never merged.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use clementine_core::{SessionUser, UserId};

use crate::api::types::ProfileUpdate;
use crate::api::{ApiError, BackendClient};
use crate::cart::CartStore;
use crate::store::{KvStore, KvStoreExt, keys};

/// Errors from session operations.
///
/// Never escapes as a panic; callers observe a resolved outcome and use
/// [`SessionError::user_message`] for display.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation requires an authenticated user.
    #[error("not logged in")]
    NotAuthenticated,
}

impl SessionError {
    /// Human-readable message suitable for display to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::NotAuthenticated => "You need to be logged in to do that".to_string(),
        }
    }
}

/// Raw snapshot of the active slots, taken before a session transition.
///
/// Held as raw store strings so reconciliation moves entries verbatim and
/// never re-interprets (or corrupts) data it only needs to relocate.
struct ActiveSnapshot {
    cart: Option<String>,
    shipping_address: Option<String>,
    payment_method: Option<String>,
}

/// Orchestrates transitions between anonymous and authenticated states.
#[derive(Clone)]
pub struct SessionController {
    api: BackendClient,
    store: Arc<dyn KvStore>,
    cart: CartStore,
}

impl SessionController {
    /// Create a session controller over shared store and cart state.
    #[must_use]
    pub fn new(api: BackendClient, store: Arc<dyn KvStore>, cart: CartStore) -> Self {
        Self { api, store, cart }
    }

    /// The persisted session user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<SessionUser> {
        self.store.read(keys::USER)
    }

    fn snapshot_active(&self) -> ActiveSnapshot {
        ActiveSnapshot {
            cart: self.store.read_raw(keys::ACTIVE_CART),
            shipping_address: self.store.read_raw(keys::ACTIVE_SHIPPING_ADDRESS),
            payment_method: self.store.read_raw(keys::ACTIVE_PAYMENT_METHOD),
        }
    }

    // =========================================================================
    // Login / Register
    // =========================================================================

    /// Log in and reconcile cart state for the returning user.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the credentials are rejected; the
    /// anonymous state is left untouched in that case.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, SessionError> {
        let anonymous = self.snapshot_active();
        let user = self.api.login(email, password).await?;

        self.store.write(keys::USER, &user);
        self.reconcile(&user.id, &anonymous);
        self.cart.resync_from_store();
        Ok(user)
    }

    /// Create an account and reconcile cart state, as for login.
    ///
    /// The API client tries the primary registration route first and falls
    /// back to the alternate route before giving up.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when every registration route fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, SessionError> {
        let anonymous = self.snapshot_active();
        let user = self.api.register(name, email, password).await?;

        self.store.write(keys::USER, &user);
        self.reconcile(&user.id, &anonymous);
        self.cart.resync_from_store();
        Ok(user)
    }

    /// Apply the reconciliation priority to each slot independently:
    /// per-user snapshot > anonymous snapshot > empty.
    fn reconcile(&self, user_id: &UserId, anonymous: &ActiveSnapshot) {
        self.reconcile_slot(
            keys::ACTIVE_CART,
            &keys::user_cart(user_id),
            anonymous.cart.as_deref(),
            // The cart is set to an explicit empty list so the UI renders
            // zero items rather than stale state.
            Some("[]"),
        );
        self.reconcile_slot(
            keys::ACTIVE_SHIPPING_ADDRESS,
            &keys::user_shipping_address(user_id),
            anonymous.shipping_address.as_deref(),
            None,
        );
        self.reconcile_slot(
            keys::ACTIVE_PAYMENT_METHOD,
            &keys::user_payment_method(user_id),
            anonymous.payment_method.as_deref(),
            None,
        );
    }

    fn reconcile_slot(
        &self,
        active_key: &str,
        user_key: &str,
        anonymous: Option<&str>,
        empty: Option<&str>,
    ) {
        if let Some(raw) = self.store.read_raw(user_key) {
            // Returning user: their snapshot wins over the anonymous cart.
            self.store.write_raw(active_key, raw);
        } else if let Some(raw) = anonymous {
            // Anonymous state is adopted and becomes the user's snapshot.
            self.store.write_raw(active_key, raw.to_owned());
            self.store.write_raw(user_key, raw.to_owned());
        } else if let Some(empty) = empty {
            self.store.write_raw(active_key, empty.to_owned());
        } else {
            self.store.remove(active_key);
        }
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// Log out, preserving the user's state for their next login.
    ///
    /// Snapshots the active slots into the user's per-user slots, clears
    /// the active slots and the user record, and leaves the active cart as
    /// an explicit empty list. Never fails: no server round-trip is needed.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        if let Some(user) = self.current_user() {
            let snapshot = self.snapshot_active();
            if let Some(raw) = snapshot.cart {
                self.store.write_raw(&keys::user_cart(&user.id), raw);
            }
            if let Some(raw) = snapshot.shipping_address {
                self.store
                    .write_raw(&keys::user_shipping_address(&user.id), raw);
            }
            if let Some(raw) = snapshot.payment_method {
                self.store
                    .write_raw(&keys::user_payment_method(&user.id), raw);
            }
        }

        self.store.remove(keys::ACTIVE_SHIPPING_ADDRESS);
        self.store.remove(keys::ACTIVE_PAYMENT_METHOD);
        self.store.remove(keys::USER);
        self.store.write_raw(keys::ACTIVE_CART, "[]".to_string());

        self.cart.resync_from_store();
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Fetch the profile and merge it into the persisted user record.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when no user (or token) is persisted, or
    /// the backend's error when the call fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<SessionUser, SessionError> {
        let current = self.current_user().ok_or(SessionError::NotAuthenticated)?;
        let token = current
            .token
            .clone()
            .ok_or(SessionError::NotAuthenticated)?;

        let fresh = self.api.get_profile(&token).await?;
        let merged = current.merged_with(fresh);
        self.store.write(keys::USER, &merged);

        // Profile changes cannot touch the cart, but the resync is made
        // unconditionally so every session transition behaves the same.
        self.cart.resync_from_store();
        Ok(merged)
    }

    /// Patch the profile and merge the response into the persisted record.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when no user (or token) is persisted, or
    /// the backend's error when the call fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<SessionUser, SessionError> {
        let current = self.current_user().ok_or(SessionError::NotAuthenticated)?;
        let token = current
            .token
            .clone()
            .ok_or(SessionError::NotAuthenticated)?;

        let fresh = self.api.update_profile(&token, update).await?;
        let merged = current.merged_with(fresh);
        self.store.write(keys::USER, &merged);

        self.cart.resync_from_store();
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use clementine_core::{CartItem, ProductId};

    use crate::config::BackendConfig;
    use crate::store::MemoryStore;

    use super::*;

    fn controller() -> (SessionController, Arc<MemoryStore>, CartStore) {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let kv: Arc<dyn KvStore> = Arc::<MemoryStore>::clone(&store);
        let cart = CartStore::new(Arc::clone(&kv));
        let api = BackendClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
        });
        let session = SessionController::new(api, kv, cart.clone());
        (session, store, cart)
    }

    fn item(id: &str, qty: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image: format!("/images/{id}.jpg"),
            price: dec!(50),
            count_in_stock: 10,
            qty,
        }
    }

    fn persist_user(store: &MemoryStore, id: &str) {
        store.write(
            keys::USER,
            &SessionUser {
                id: UserId::new(id),
                name: "Test".to_string(),
                email: "test@example.com".to_string(),
                is_admin: false,
                token: Some("tok".to_string()),
            },
        );
    }

    #[test]
    fn test_logout_preserves_cart_for_next_login() {
        let (session, store, cart) = controller();
        persist_user(&store, "u-1");
        cart.add_or_update(item("a", 2)).expect("in stock");

        session.logout();

        // Per-user snapshot survives, active cart is explicitly empty.
        let snapshot: Vec<CartItem> = store
            .read(&keys::user_cart(&UserId::new("u-1")))
            .expect("snapshot present");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.read_raw(keys::ACTIVE_CART).as_deref(), Some("[]"));
        assert!(store.read_raw(keys::USER).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_logout_when_anonymous_clears_without_snapshot() {
        let (session, store, cart) = controller();
        cart.add_or_update(item("a", 2)).expect("in stock");

        session.logout();

        assert_eq!(store.read_raw(keys::ACTIVE_CART).as_deref(), Some("[]"));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_profile_requires_authentication() {
        let (session, _, _) = controller();
        let err = session.get_profile().await.expect_err("no user persisted");
        assert!(matches!(err, SessionError::NotAuthenticated));
        assert_eq!(err.user_message(), "You need to be logged in to do that");
    }

    #[test]
    fn test_reconcile_user_snapshot_wins() {
        let (session, store, _) = controller();
        let user_id = UserId::new("u-1");
        store.write(&keys::user_cart(&user_id), &vec![item("mine", 1)]);

        let anonymous = ActiveSnapshot {
            cart: Some(serde_json::to_string(&vec![item("anon", 1)]).expect("serialize")),
            shipping_address: None,
            payment_method: None,
        };
        session.reconcile(&user_id, &anonymous);

        let active: Vec<CartItem> = store.read(keys::ACTIVE_CART).expect("active cart");
        assert_eq!(active.first().map(|i| i.product_id.as_str()), Some("mine"));
    }

    #[test]
    fn test_reconcile_adopts_anonymous_cart() {
        let (session, store, _) = controller();
        let user_id = UserId::new("u-1");

        let anon_items = vec![item("anon", 1)];
        let anonymous = ActiveSnapshot {
            cart: Some(serde_json::to_string(&anon_items).expect("serialize")),
            shipping_address: None,
            payment_method: None,
        };
        session.reconcile(&user_id, &anonymous);

        let active: Vec<CartItem> = store.read(keys::ACTIVE_CART).expect("active cart");
        let snapshot: Vec<CartItem> = store
            .read(&keys::user_cart(&user_id))
            .expect("snapshot copied");
        assert_eq!(active, anon_items);
        assert_eq!(snapshot, anon_items);
    }

    #[test]
    fn test_reconcile_both_empty_yields_explicit_empty_cart() {
        let (session, store, _) = controller();
        let anonymous = ActiveSnapshot {
            cart: None,
            shipping_address: None,
            payment_method: None,
        };
        session.reconcile(&UserId::new("u-1"), &anonymous);

        assert_eq!(store.read_raw(keys::ACTIVE_CART).as_deref(), Some("[]"));
        assert!(store.read_raw(keys::ACTIVE_SHIPPING_ADDRESS).is_none());
        assert!(store.read_raw(keys::ACTIVE_PAYMENT_METHOD).is_none());
    }
}
