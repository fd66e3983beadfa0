//! Three-step checkout wizard: shipping, payment, review.
//!
//! The flow validates each step before advancing, computes display totals
//! from the cart, and submits the order exactly once. The backend remains
//! the authority on pricing; the totals computed here are what the client
//! shows and sends, and the server re-validates them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use clementine_core::{CartItem, Order, OrderItem, PaymentMethod, ShippingAddress};

use crate::api::types::CreateOrderRequest;
use crate::api::{ApiError, BackendClient};
use crate::cart::CartStore;
use crate::config::CheckoutPricing;
use crate::store::{KvStore, KvStoreExt, keys};

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout requires a logged-in user.
    #[error("checkout requires a logged-in user")]
    NotAuthenticated,

    /// Checkout requires a non-empty cart.
    #[error("the cart is empty")]
    EmptyCart,

    /// A step was attempted before its prerequisites were complete.
    #[error("{0}")]
    Validation(String),

    /// An order submission is already in flight.
    #[error("an order submission is already in progress")]
    AlreadySubmitting,

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Human-readable message suitable for display to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Please log in before checking out".to_string(),
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::Validation(message) => message.clone(),
            Self::AlreadySubmitting => "Your order is already being placed".to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}

/// The wizard's current step. Steps advance in order and never skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckoutStep {
    Shipping,
    Payment,
    Review,
}

/// Totals shown on the review step and sent with the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of `price * qty` over the cart.
    pub subtotal: Decimal,
    /// Zero at or above the free-shipping threshold (and for an empty
    /// cart), otherwise the flat fee.
    pub shipping: Decimal,
    /// Tax on the subtotal, rounded to cents.
    pub tax: Decimal,
    /// `subtotal + shipping + tax`.
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals for `items` under the given pricing parameters.
    #[must_use]
    pub fn compute(items: &[CartItem], pricing: &CheckoutPricing) -> Self {
        let subtotal: Decimal = items
            .iter()
            .map(|item| item.price * Decimal::from(item.qty))
            .sum();

        let shipping = if subtotal.is_zero() || subtotal >= pricing.free_shipping_threshold {
            Decimal::ZERO
        } else {
            pricing.flat_shipping_fee
        };

        let tax = (subtotal * pricing.tax_rate).round_dp(2).normalize();
        let total = (subtotal + shipping + tax).normalize();

        Self {
            subtotal: subtotal.normalize(),
            shipping: shipping.normalize(),
            tax,
            total,
        }
    }
}

// =============================================================================
// CheckoutFlow
// =============================================================================

/// One checkout attempt, created per entry into the wizard.
///
/// Cheaply cloneable; clones share the step cursor and the in-flight
/// submission guard.
#[derive(Clone)]
pub struct CheckoutFlow {
    inner: Arc<CheckoutFlowInner>,
}

struct CheckoutFlowInner {
    api: BackendClient,
    store: Arc<dyn KvStore>,
    cart: CartStore,
    pricing: CheckoutPricing,
    step: std::sync::Mutex<CheckoutStep>,
    submitting: AtomicBool,
}

impl CheckoutFlow {
    /// Enter the checkout wizard.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when no session user is persisted, or
    /// `EmptyCart` when there is nothing to order. Either way the wizard
    /// is not entered.
    pub fn begin(
        api: BackendClient,
        store: Arc<dyn KvStore>,
        cart: CartStore,
        pricing: CheckoutPricing,
    ) -> Result<Self, CheckoutError> {
        if store
            .read::<clementine_core::SessionUser>(keys::USER)
            .and_then(|user| user.token)
            .is_none()
        {
            return Err(CheckoutError::NotAuthenticated);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // Returning users resume at the first incomplete step.
        let step = if cart.shipping_address().is_none() {
            CheckoutStep::Shipping
        } else {
            CheckoutStep::Payment
        };

        Ok(Self {
            inner: Arc::new(CheckoutFlowInner {
                api,
                store,
                cart,
                pricing,
                step: std::sync::Mutex::new(step),
                submitting: AtomicBool::new(false),
            }),
        })
    }

    fn step_guard(&self) -> std::sync::MutexGuard<'_, CheckoutStep> {
        self.inner
            .step
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The step the wizard is currently on.
    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        *self.step_guard()
    }

    /// Totals for the current cart contents.
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        OrderTotals::compute(&self.inner.cart.items(), &self.inner.pricing)
    }

    /// Save the shipping address and advance to the payment step.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a required address field is blank.
    #[instrument(skip(self, address))]
    pub fn submit_shipping(&self, address: ShippingAddress) -> Result<(), CheckoutError> {
        if !address.is_complete() {
            return Err(CheckoutError::Validation(
                "Please fill in every shipping address field".to_string(),
            ));
        }

        self.inner.cart.set_shipping_address(address);
        let mut step = self.step_guard();
        if *step < CheckoutStep::Payment {
            *step = CheckoutStep::Payment;
        }
        Ok(())
    }

    /// Save the payment method and advance to the review step.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the shipping step was skipped.
    #[instrument(skip(self))]
    pub fn submit_payment(&self, method: PaymentMethod) -> Result<(), CheckoutError> {
        if self.step() < CheckoutStep::Payment {
            return Err(CheckoutError::Validation(
                "Please enter a shipping address first".to_string(),
            ));
        }

        self.inner.cart.set_payment_method(method);
        *self.step_guard() = CheckoutStep::Review;
        Ok(())
    }

    /// Place the order.
    ///
    /// At most one submission runs at a time; a second call while one is in
    /// flight fails fast with `AlreadySubmitting` rather than producing a
    /// duplicate order. The cart is cleared only after the backend accepts.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the review step has not been
    /// reached, or the backend's error when the order is rejected. The
    /// cart is preserved on failure so the user can retry.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<Order, CheckoutError> {
        if self.step() < CheckoutStep::Review {
            return Err(CheckoutError::Validation(
                "Please complete shipping and payment first".to_string(),
            ));
        }

        let token = self
            .inner
            .store
            .read::<clementine_core::SessionUser>(keys::USER)
            .and_then(|user| user.token)
            .ok_or(CheckoutError::NotAuthenticated)?;

        let items = self.inner.cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let shipping_address = self
            .inner
            .cart
            .shipping_address()
            .ok_or_else(|| CheckoutError::Validation("Shipping address is missing".to_string()))?;

        if self
            .inner
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CheckoutError::AlreadySubmitting);
        }

        let totals = OrderTotals::compute(&items, &self.inner.pricing);
        let request = CreateOrderRequest {
            order_items: items.iter().map(OrderItem::from).collect(),
            shipping_address,
            payment_method: self.inner.cart.payment_method(),
            total_price: totals.total,
        };

        let result = self.inner.api.create_order(&token, &request).await;
        self.inner.submitting.store(false, Ordering::SeqCst);

        match result {
            Ok(order) => {
                info!(order_id = %order.id, "order placed");
                self.inner.cart.clear();
                Ok(order)
            }
            Err(e) => Err(CheckoutError::Api(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use clementine_core::{ProductId, SessionUser, UserId};

    use crate::config::BackendConfig;
    use crate::store::MemoryStore;

    use super::*;

    fn item(id: &str, price: Decimal, qty: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image: format!("/images/{id}.jpg"),
            price,
            count_in_stock: 50,
            qty,
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "12345".to_string(),
            country: "USA".to_string(),
            phone_number: "555-0100".to_string(),
        }
    }

    fn logged_in_setup() -> (BackendClient, Arc<dyn KvStore>, CartStore) {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        store.write(
            keys::USER,
            &SessionUser {
                id: UserId::new("u-1"),
                name: "Test".to_string(),
                email: "test@example.com".to_string(),
                is_admin: false,
                token: Some("tok".to_string()),
            },
        );
        let cart = CartStore::new(Arc::clone(&store));
        let api = BackendClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
        });
        (api, store, cart)
    }

    #[test]
    fn test_totals_below_free_shipping_threshold() {
        let items = vec![item("a", dec!(100), 2)];
        let totals = OrderTotals::compute(&items, &CheckoutPricing::default());

        assert_eq!(totals.subtotal, dec!(200));
        assert_eq!(totals.shipping, dec!(10));
        assert_eq!(totals.tax, dec!(20));
        assert_eq!(totals.total, dec!(230));
    }

    #[test]
    fn test_totals_at_threshold_ship_free() {
        let items = vec![item("a", dec!(250), 2)];
        let totals = OrderTotals::compute(&items, &CheckoutPricing::default());

        assert_eq!(totals.subtotal, dec!(500));
        assert_eq!(totals.shipping, dec!(0));
        assert_eq!(totals.tax, dec!(50));
        assert_eq!(totals.total, dec!(550));
    }

    #[test]
    fn test_totals_empty_cart_all_zero() {
        let totals = OrderTotals::compute(&[], &CheckoutPricing::default());

        assert_eq!(totals.subtotal, dec!(0));
        // No flat fee on an empty cart.
        assert_eq!(totals.shipping, dec!(0));
        assert_eq!(totals.tax, dec!(0));
        assert_eq!(totals.total, dec!(0));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        let items = vec![item("a", dec!(33.33), 1)];
        let totals = OrderTotals::compute(&items, &CheckoutPricing::default());

        // 33.33 * 0.1 = 3.333, rounded to 3.33.
        assert_eq!(totals.tax, dec!(3.33));
        assert_eq!(totals.total, dec!(46.66));
    }

    #[test]
    fn test_begin_requires_login() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let cart = CartStore::new(Arc::clone(&store));
        cart.add_or_update(item("a", dec!(10), 1)).expect("in stock");
        let api = BackendClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
        });

        let err = CheckoutFlow::begin(api, store, cart, CheckoutPricing::default())
            .map(|_| ())
            .expect_err("anonymous user rejected");
        assert!(matches!(err, CheckoutError::NotAuthenticated));
    }

    #[test]
    fn test_begin_requires_non_empty_cart() {
        let (api, store, cart) = logged_in_setup();

        let err = CheckoutFlow::begin(api, store, cart, CheckoutPricing::default())
            .map(|_| ())
            .expect_err("empty cart rejected");
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[test]
    fn test_steps_cannot_be_skipped() {
        let (api, store, cart) = logged_in_setup();
        cart.add_or_update(item("a", dec!(10), 1)).expect("in stock");

        let flow =
            CheckoutFlow::begin(api, store, cart, CheckoutPricing::default()).expect("guard passes");
        assert_eq!(flow.step(), CheckoutStep::Shipping);

        // Payment before shipping is rejected.
        let err = flow
            .submit_payment(PaymentMethod::PayPal)
            .expect_err("shipping not entered yet");
        assert!(matches!(err, CheckoutError::Validation(_)));

        flow.submit_shipping(address()).expect("complete address");
        assert_eq!(flow.step(), CheckoutStep::Payment);
        flow.submit_payment(PaymentMethod::CreditCard)
            .expect("shipping done");
        assert_eq!(flow.step(), CheckoutStep::Review);
    }

    #[test]
    fn test_incomplete_address_rejected() {
        let (api, store, cart) = logged_in_setup();
        cart.add_or_update(item("a", dec!(10), 1)).expect("in stock");

        let flow =
            CheckoutFlow::begin(api, store, cart, CheckoutPricing::default()).expect("guard passes");

        let mut incomplete = address();
        incomplete.city = "  ".to_string();
        let err = flow
            .submit_shipping(incomplete)
            .expect_err("blank city rejected");
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert_eq!(flow.step(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_begin_resumes_at_payment_with_saved_address() {
        let (api, store, cart) = logged_in_setup();
        cart.add_or_update(item("a", dec!(10), 1)).expect("in stock");
        cart.set_shipping_address(address());

        let flow =
            CheckoutFlow::begin(api, store, cart, CheckoutPricing::default()).expect("guard passes");
        assert_eq!(flow.step(), CheckoutStep::Payment);
    }

    #[tokio::test]
    async fn test_submit_before_review_rejected() {
        let (api, store, cart) = logged_in_setup();
        cart.add_or_update(item("a", dec!(10), 1)).expect("in stock");

        let flow =
            CheckoutFlow::begin(api, store, cart, CheckoutPricing::default()).expect("guard passes");
        let err = flow.submit().await.expect_err("review not reached");
        assert!(matches!(err, CheckoutError::Validation(_)));
    }
}
