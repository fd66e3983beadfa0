//! Application state wiring the subsystem together.

use std::sync::Arc;

use crate::api::BackendClient;
use crate::cart::CartStore;
use crate::checkout::{CheckoutError, CheckoutFlow};
use crate::config::StorefrontConfig;
use crate::session::SessionController;
use crate::store::{JsonFileStore, KvStore};

/// Application state shared across the whole client.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// persistent store, the backend client, and the cart and session state
/// built on top of them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn KvStore>,
    api: BackendClient,
    cart: CartStore,
    session: SessionController,
}

impl AppState {
    /// Create application state over the file store named in the config.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let store: Arc<dyn KvStore> = Arc::new(JsonFileStore::new(config.store_path.clone()));
        Self::with_store(config, store)
    }

    /// Create application state over an injected store.
    ///
    /// Tests use this with an in-memory store.
    #[must_use]
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn KvStore>) -> Self {
        let api = BackendClient::new(&config.backend);
        let cart = CartStore::new(Arc::clone(&store));
        let session = SessionController::new(api.clone(), Arc::clone(&store), cart.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                api,
                cart,
                session,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the persistent key-value store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.inner.store
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &BackendClient {
        &self.inner.api
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the session controller.
    #[must_use]
    pub fn session(&self) -> &SessionController {
        &self.inner.session
    }

    /// Enter the checkout wizard.
    ///
    /// # Errors
    ///
    /// Returns an error when the user is not logged in or the cart is
    /// empty; the wizard is not entered in that case.
    pub fn begin_checkout(&self) -> Result<CheckoutFlow, CheckoutError> {
        CheckoutFlow::begin(
            self.inner.api.clone(),
            Arc::clone(&self.inner.store),
            self.inner.cart.clone(),
            self.inner.config.pricing,
        )
    }
}
