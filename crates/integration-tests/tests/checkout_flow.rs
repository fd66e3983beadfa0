//! Checkout wizard: totals, submission, and the duplicate-order guard.

use std::time::Duration;

use httpmock::prelude::*;
use rust_decimal::dec;

use clementine_core::{PaymentMethod, ShippingAddress};
use clementine_storefront::checkout::CheckoutError;

use clementine_integration_tests::{TestHarness, cart_item, order_json, user_json};

fn address() -> ShippingAddress {
    ShippingAddress {
        address: "1 Main St".to_string(),
        city: "Hanoi".to_string(),
        postal_code: "10000".to_string(),
        country: "Vietnam".to_string(),
        phone_number: "555-0100".to_string(),
    }
}

async fn logged_in_harness() -> TestHarness {
    let h = TestHarness::new().await;
    h.server
        .mock_async(|when, then| {
            when.method(POST).path("/users/login");
            then.status(200).json_body(user_json("u-1", "tok"));
        })
        .await;
    h.state
        .session()
        .login("mai@example.com", "secret")
        .await
        .expect("login succeeds");
    h
}

#[tokio::test]
async fn test_order_submission_sends_computed_total_and_clears_cart() {
    let h = logged_in_harness().await;
    // Subtotal 200, flat shipping 10, tax 20.
    h.state
        .cart()
        .add_or_update(cart_item("a", dec!(100), 2))
        .expect("in stock");

    let create_order = h
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/orders")
                .header("authorization", "Bearer tok")
                .json_body_partial(r#"{"totalPrice": "230", "paymentMethod": "CreditCard"}"#);
            then.status(201).json_body(order_json("o-1", 230.0));
        })
        .await;

    let flow = h.state.begin_checkout().expect("guard passes");
    flow.submit_shipping(address()).expect("complete address");
    flow.submit_payment(PaymentMethod::CreditCard)
        .expect("shipping done");

    let totals = flow.totals();
    assert_eq!(totals.total, dec!(230));

    let order = flow.submit().await.expect("order accepted");
    assert_eq!(order.total_price, dec!(230));

    create_order.assert_async().await;
    // Only a successful submission empties the cart, and the user's
    // snapshot is removed rather than left as a stale empty list.
    assert!(h.state.cart().is_empty());
    assert!(
        h.store
            .read_raw(&clementine_storefront::store::keys::user_cart(
                &clementine_core::UserId::new("u-1")
            ))
            .is_none()
    );
}

#[tokio::test]
async fn test_rejected_order_preserves_the_cart() {
    let h = logged_in_harness().await;
    h.state
        .cart()
        .add_or_update(cart_item("a", dec!(100), 1))
        .expect("in stock");

    h.server
        .mock_async(|when, then| {
            when.method(POST).path("/orders");
            then.status(400)
                .json_body(serde_json::json!({"message": "Product a is out of stock"}));
        })
        .await;

    let flow = h.state.begin_checkout().expect("guard passes");
    flow.submit_shipping(address()).expect("complete address");
    flow.submit_payment(PaymentMethod::PayPal).expect("shipping done");

    let err = flow.submit().await.expect_err("backend rejects");
    assert_eq!(err.user_message(), "Product a is out of stock");
    assert_eq!(h.state.cart().items().len(), 1);
}

#[tokio::test]
async fn test_checkout_requires_login_and_items() {
    let h = TestHarness::new().await;

    // Anonymous with items: rejected.
    h.state
        .cart()
        .add_or_update(cart_item("a", dec!(10), 1))
        .expect("in stock");
    assert!(matches!(
        h.state.begin_checkout().map(|_| ()),
        Err(CheckoutError::NotAuthenticated)
    ));

    // Logged in with an empty cart: rejected.
    let h = logged_in_harness().await;
    h.state.cart().clear();
    assert!(matches!(
        h.state.begin_checkout().map(|_| ()),
        Err(CheckoutError::EmptyCart)
    ));
}

#[tokio::test]
async fn test_concurrent_submissions_place_one_order() {
    let h = logged_in_harness().await;
    h.state
        .cart()
        .add_or_update(cart_item("a", dec!(100), 1))
        .expect("in stock");

    let create_order = h
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/orders");
            then.status(201)
                .delay(Duration::from_millis(250))
                .json_body(order_json("o-1", 120.0));
        })
        .await;

    let flow = h.state.begin_checkout().expect("guard passes");
    flow.submit_shipping(address()).expect("complete address");
    flow.submit_payment(PaymentMethod::PayPal).expect("shipping done");

    let second = flow.clone();
    let (first_result, second_result) = tokio::join!(flow.submit(), second.submit());

    let results = [first_result, second_result];
    let placed = results.iter().filter(|r| r.is_ok()).count();
    let blocked = results
        .iter()
        .filter(|r| matches!(r, Err(CheckoutError::AlreadySubmitting)))
        .count();

    assert_eq!(placed, 1);
    assert_eq!(blocked, 1);
    create_order.assert_hits_async(1).await;
}
