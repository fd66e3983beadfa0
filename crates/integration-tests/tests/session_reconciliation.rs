//! Session transitions and the cart reconciliation rule.
//!
//! On login the per-user snapshot wins over the anonymous cart, which in
//! turn wins over nothing; logout snapshots state for the next login.

use httpmock::prelude::*;
use rust_decimal::dec;

use clementine_core::{CartItem, UserId};
use clementine_storefront::store::{KvStoreExt, keys};

use clementine_integration_tests::{TestHarness, cart_item, user_json};

#[tokio::test]
async fn test_login_restores_user_snapshot_over_anonymous_cart() {
    let h = TestHarness::new().await;
    h.server
        .mock_async(|when, then| {
            when.method(POST).path("/users/login");
            then.status(200).json_body(user_json("u-1", "tok"));
        })
        .await;

    // The returning user left a saved cart behind; an anonymous visitor
    // also put something in the cart on this device.
    h.store.write(
        &keys::user_cart(&UserId::new("u-1")),
        &vec![cart_item("saved", dec!(10), 1)],
    );
    h.state
        .cart()
        .add_or_update(cart_item("anon", dec!(20), 1))
        .expect("in stock");

    h.state
        .session()
        .login("mai@example.com", "secret")
        .await
        .expect("login succeeds");

    let items = h.state.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().map(|i| i.product_id.as_str()), Some("saved"));
}

#[tokio::test]
async fn test_login_adopts_anonymous_cart_for_new_user() {
    let h = TestHarness::new().await;
    h.server
        .mock_async(|when, then| {
            when.method(POST).path("/users/login");
            then.status(200).json_body(user_json("u-2", "tok"));
        })
        .await;

    h.state
        .cart()
        .add_or_update(cart_item("anon", dec!(20), 2))
        .expect("in stock");

    h.state
        .session()
        .login("mai@example.com", "secret")
        .await
        .expect("login succeeds");

    // The anonymous cart carries over and becomes the user's snapshot.
    let items = h.state.cart().items();
    assert_eq!(items.first().map(|i| i.product_id.as_str()), Some("anon"));
    let snapshot: Vec<CartItem> = h
        .store
        .read(&keys::user_cart(&UserId::new("u-2")))
        .expect("snapshot written");
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn test_failed_login_leaves_anonymous_state_untouched() {
    let h = TestHarness::new().await;
    h.server
        .mock_async(|when, then| {
            when.method(POST).path("/users/login");
            then.status(401)
                .json_body(serde_json::json!({"message": "Invalid email or password"}));
        })
        .await;

    h.state
        .cart()
        .add_or_update(cart_item("anon", dec!(20), 1))
        .expect("in stock");

    let err = h
        .state
        .session()
        .login("mai@example.com", "wrong")
        .await
        .expect_err("credentials rejected");

    assert_eq!(err.user_message(), "Invalid email or password");
    assert_eq!(h.state.cart().items().len(), 1);
    assert!(h.state.session().current_user().is_none());
}

#[tokio::test]
async fn test_register_falls_back_to_alternate_route() {
    let h = TestHarness::new().await;
    let primary = h
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/users");
            then.status(404);
        })
        .await;
    let fallback = h
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/users/register");
            then.status(201).json_body(user_json("u-3", "tok"));
        })
        .await;

    let user = h
        .state
        .session()
        .register("Mai Tran", "mai@example.com", "secret")
        .await
        .expect("fallback route succeeds");

    assert_eq!(user.id, UserId::new("u-3"));
    primary.assert_async().await;
    fallback.assert_async().await;
}

#[tokio::test]
async fn test_profile_refresh_sends_bearer_token_and_keeps_it() {
    let h = TestHarness::new().await;
    // Profile responses omit the token; the merged record must keep it.
    h.server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/profile")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(serde_json::json!({
                "_id": "u-1",
                "name": "Mai T.",
                "email": "mai@example.com",
                "isAdmin": false,
            }));
        })
        .await;

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

    let user = h
        .state
        .session()
        .get_profile()
        .await
        .expect("profile fetched");

    assert_eq!(user.name, "Mai T.");
    assert_eq!(user.token.as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_logout_then_login_restores_the_cart() {
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
    h.state
        .cart()
        .add_or_update(cart_item("keep", dec!(15), 3))
        .expect("in stock");

    h.state.session().logout();
    assert!(h.state.cart().is_empty());
    assert!(h.state.session().current_user().is_none());

    h.state
        .session()
        .login("mai@example.com", "secret")
        .await
        .expect("login succeeds");

    let items = h.state.cart().items();
    assert_eq!(items.first().map(|i| i.product_id.as_str()), Some("keep"));
    assert_eq!(items.first().map(|i| i.qty), Some(3));
}
