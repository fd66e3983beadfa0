//! In-memory cart state mirrored into the persistent store.
//!
//! The cart store owns the `active*` slots: every mutation persists the
//! active slot, and additionally writes through to the matching per-user
//! snapshot whenever a session user is present. Session transitions call
//! [`CartStore::resync_from_store`] to pull reconciled state back in.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::instrument;

use clementine_core::{CartItem, PaymentMethod, ProductId, ShippingAddress};

use crate::store::{KvStore, KvStoreExt, current_user_id, keys};

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product has no stock; nothing can be added.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },
}

/// The in-memory mirror of the active cart slots.
#[derive(Debug, Clone, Default)]
struct CartState {
    items: Vec<CartItem>,
    shipping_address: Option<ShippingAddress>,
    payment_method: PaymentMethod,
}

/// Cart state container, cheaply cloneable.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    store: Arc<dyn KvStore>,
    state: Mutex<CartState>,
}

impl CartStore {
    /// Create a cart store over the given persistent store, loading the
    /// active slots immediately (app boot behavior).
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let cart = Self {
            inner: Arc::new(CartStoreInner {
                store,
                state: Mutex::new(CartState::default()),
            }),
        };
        cart.resync_from_store();
        cart
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current cart items, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().items.clone()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Current shipping address, if one has been saved.
    #[must_use]
    pub fn shipping_address(&self) -> Option<ShippingAddress> {
        self.lock().shipping_address.clone()
    }

    /// Current payment method selection.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.lock().payment_method
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item, or replace the existing entry for the same product.
    ///
    /// There is no separate increment operation: calling this with a new
    /// `qty` is how quantity updates happen. The quantity is clamped to
    /// `[1, count_in_stock]` here so the invariant holds for every caller.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfStock` when the item's stock count is zero.
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub fn add_or_update(&self, mut item: CartItem) -> Result<(), CartError> {
        if item.count_in_stock == 0 {
            return Err(CartError::OutOfStock { name: item.name });
        }
        item.qty = item.qty.clamp(1, item.count_in_stock);

        let mut state = self.lock();
        match state
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => *existing = item,
            None => state.items.push(item),
        }
        self.persist_cart(&state);
        Ok(())
    }

    /// Remove the item for `product_id`, if present.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove(&self, product_id: &ProductId) {
        let mut state = self.lock();
        state.items.retain(|item| &item.product_id != product_id);
        self.persist_cart(&state);
    }

    /// Save the shipping address.
    pub fn set_shipping_address(&self, address: ShippingAddress) {
        let mut state = self.lock();
        state.shipping_address = Some(address.clone());
        drop(state);

        let store = self.inner.store.as_ref();
        store.write(keys::ACTIVE_SHIPPING_ADDRESS, &address);
        if let Some(user_id) = current_user_id(store) {
            store.write(&keys::user_shipping_address(&user_id), &address);
        }
    }

    /// Save the payment method selection.
    pub fn set_payment_method(&self, method: PaymentMethod) {
        let mut state = self.lock();
        state.payment_method = method;
        drop(state);

        let store = self.inner.store.as_ref();
        store.write(keys::ACTIVE_PAYMENT_METHOD, &method);
        if let Some(user_id) = current_user_id(store) {
            store.write(&keys::user_payment_method(&user_id), &method);
        }
    }

    /// Empty the cart.
    ///
    /// The active slot is persisted as an explicit empty list, while the
    /// per-user cart snapshot is removed entirely so the next login sees
    /// "no cart recorded" rather than a stale empty cart.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let mut state = self.lock();
        state.items.clear();
        let empty: Vec<CartItem> = Vec::new();
        drop(state);

        let store = self.inner.store.as_ref();
        store.write(keys::ACTIVE_CART, &empty);
        if let Some(user_id) = current_user_id(store) {
            store.remove(&keys::user_cart(&user_id));
        }
    }

    /// Re-read the active slots from the persistent store.
    ///
    /// Called after every session transition. A missing or corrupt entry
    /// falls back to the empty cart / no address / default payment method.
    #[instrument(skip(self))]
    pub fn resync_from_store(&self) {
        let store = self.inner.store.as_ref();
        let items: Vec<CartItem> = store.read(keys::ACTIVE_CART).unwrap_or_default();
        let shipping_address = store.read(keys::ACTIVE_SHIPPING_ADDRESS);
        let payment_method = store
            .read(keys::ACTIVE_PAYMENT_METHOD)
            .unwrap_or_default();

        let mut state = self.lock();
        state.items = items;
        state.shipping_address = shipping_address;
        state.payment_method = payment_method;
    }

    /// Persist the item list to the active slot and, when a user is
    /// present, to that user's per-user snapshot.
    fn persist_cart(&self, state: &CartState) {
        let store = self.inner.store.as_ref();
        store.write(keys::ACTIVE_CART, &state.items);
        if let Some(user_id) = current_user_id(store) {
            store.write(&keys::user_cart(&user_id), &state.items);
        }
    }
}
