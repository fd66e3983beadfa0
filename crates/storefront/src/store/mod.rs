//! Durable key-value store for cart and session state.
//!
//! Plays the role browser local storage plays for a web client: a small,
//! synchronous, string-keyed JSON store. The store is injected as a
//! [`KvStore`] trait object rather than accessed as ambient state, so tests
//! substitute [`MemoryStore`] for the durable [`JsonFileStore`].
//!
//! Decode failures are fail-soft: a corrupt entry reads as absent, with a
//! warning log, and is never surfaced as an error.

mod file;

pub use file::JsonFileStore;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use clementine_core::UserId;

/// Keys for the persisted entries.
///
/// The `active*` slots hold what the UI currently shows; the per-user keys
/// snapshot a user's state across logout/login cycles.
pub mod keys {
    use clementine_core::UserId;

    /// The currently displayed cart.
    pub const ACTIVE_CART: &str = "activeCart";

    /// The currently displayed shipping address.
    pub const ACTIVE_SHIPPING_ADDRESS: &str = "activeShippingAddress";

    /// The currently displayed payment method.
    pub const ACTIVE_PAYMENT_METHOD: &str = "activePaymentMethod";

    /// The authenticated session user, absent when anonymous.
    pub const USER: &str = "user";

    /// Per-user cart snapshot.
    #[must_use]
    pub fn user_cart(user_id: &UserId) -> String {
        format!("cart:{user_id}")
    }

    /// Per-user shipping address snapshot.
    #[must_use]
    pub fn user_shipping_address(user_id: &UserId) -> String {
        format!("shippingAddress:{user_id}")
    }

    /// Per-user payment method snapshot.
    #[must_use]
    pub fn user_payment_method(user_id: &UserId) -> String {
        format!("paymentMethod:{user_id}")
    }
}

/// A synchronous, string-keyed store of JSON-encoded entries.
///
/// Single-process, last-writer-wins; concurrent processes sharing a file
/// store are not coordinated (accepted scope, as for browser tabs).
pub trait KvStore: Send + Sync {
    /// Read the raw JSON string stored under `key`, if any.
    fn read_raw(&self, key: &str) -> Option<String>;

    /// Persist a raw JSON string under `key`.
    fn write_raw(&self, key: &str, value: String);

    /// Remove the entry under `key`, if any.
    fn remove(&self, key: &str);
}

/// Typed read/write helpers over any [`KvStore`].
pub trait KvStoreExt {
    /// Read and decode the entry under `key`.
    ///
    /// Returns `None` if the key is missing *or* the entry fails to decode;
    /// decode failures are logged and treated as absent data.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T>;

    /// Encode and persist `value` under `key`.
    fn write<T: Serialize>(&self, key: &str, value: &T);
}

impl<S: KvStore + ?Sized> KvStoreExt for S {
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "discarding corrupt store entry");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.write_raw(key, raw),
            Err(e) => warn!(key = %key, error = %e, "failed to encode store entry"),
        }
    }
}

/// Snapshot the active user's id from the store, if a user is present.
#[must_use]
pub fn current_user_id(store: &dyn KvStore) -> Option<UserId> {
    store
        .read::<clementine_core::SessionUser>(keys::USER)
        .map(|user| user.id)
}

/// In-memory store, used in tests and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn read_raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write_raw(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
    }
}
