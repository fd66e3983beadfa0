//! Integration tests for Clementine.
//!
//! Every test runs against a mocked backend (`httpmock`), so no external
//! services are required:
//!
//! ```bash
//! cargo test -p clementine-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_sync` - Cart persistence and write-through behavior
//! - `session_reconciliation` - Login/logout cart reconciliation
//! - `checkout_flow` - Checkout wizard and order submission

use std::path::PathBuf;
use std::sync::Arc;

use httpmock::MockServer;
use serde_json::{Value, json};

use clementine_storefront::config::{BackendConfig, CheckoutPricing, StorefrontConfig};
use clementine_storefront::state::AppState;
use clementine_storefront::store::{KvStore, MemoryStore};

/// A storefront wired to a mock backend and an in-memory store.
pub struct TestHarness {
    pub server: MockServer,
    pub store: Arc<dyn KvStore>,
    pub state: AppState,
}

impl TestHarness {
    /// Start a mock backend and build application state against it.
    pub async fn new() -> Self {
        let server = MockServer::start_async().await;
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());

        let config = StorefrontConfig {
            backend: BackendConfig {
                base_url: server.base_url(),
            },
            store_path: PathBuf::from("unused.json"),
            pricing: CheckoutPricing::default(),
        };
        let state = AppState::with_store(config, Arc::clone(&store));

        Self {
            server,
            store,
            state,
        }
    }
}

/// A cart item with sensible defaults for tests.
#[must_use]
pub fn cart_item(id: &str, price: rust_decimal::Decimal, qty: u32) -> clementine_core::CartItem {
    clementine_core::CartItem {
        product_id: clementine_core::ProductId::new(id),
        name: format!("Product {id}"),
        image: format!("/images/{id}.jpg"),
        price,
        count_in_stock: 50,
        qty,
    }
}

/// A session user response body, as the auth endpoints return it.
#[must_use]
pub fn user_json(id: &str, token: &str) -> Value {
    json!({
        "_id": id,
        "name": "Mai Tran",
        "email": "mai@example.com",
        "isAdmin": false,
        "token": token,
    })
}

/// A minimal order response body, as `POST /orders` returns it.
#[must_use]
pub fn order_json(id: &str, total: f64) -> Value {
    json!({
        "_id": id,
        "orderItems": [],
        "shippingAddress": {
            "address": "1 Main St",
            "city": "Hanoi",
            "postalCode": "10000",
            "country": "Vietnam",
            "phoneNumber": "555-0100"
        },
        "paymentMethod": "PayPal",
        "totalPrice": total,
    })
}
