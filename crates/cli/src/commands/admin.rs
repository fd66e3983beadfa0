//! Back-office commands. The backend enforces admin authorization; these
//! just forward the logged-in user's token.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::info;

use clementine_core::{OrderId, ProductId, UserId};
use clementine_storefront::api::types::ProductInput;

use super::{app_state, auth_token};

/// Create a product.
///
/// # Errors
///
/// Returns an error if not logged in, the price fails to parse, or the
/// backend rejects the call.
pub async fn product_create(
    name: String,
    price: &str,
    stock: u32,
    image: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    description: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    let input = ProductInput {
        name: Some(name),
        image,
        brand,
        category,
        description,
        price: Some(parse_price(price)?),
        count_in_stock: Some(stock),
    };
    let product = state
        .api()
        .create_product(&token, &input)
        .await
        .map_err(|e| e.user_message())?;

    info!(product_id = %product.id, "Product created");
    Ok(())
}

/// Update fields of a product. Absent flags leave fields unchanged.
///
/// # Errors
///
/// Returns an error if not logged in, nothing was passed to change, or
/// the backend rejects the call.
pub async fn product_update(
    product_id: &str,
    name: Option<String>,
    price: Option<&str>,
    stock: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    if name.is_none() && price.is_none() && stock.is_none() {
        return Err("Nothing to update: pass --name, --price, or --stock".into());
    }

    let state = app_state()?;
    let token = auth_token(&state)?;

    let input = ProductInput {
        name,
        price: price.map(parse_price).transpose()?,
        count_in_stock: stock,
        ..ProductInput::default()
    };
    let product = state
        .api()
        .update_product(&token, &ProductId::new(product_id), &input)
        .await
        .map_err(|e| e.user_message())?;

    info!(product_id = %product.id, "Product updated");
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns an error if not logged in or the backend rejects the call.
pub async fn product_delete(product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    state
        .api()
        .delete_product(&token, &ProductId::new(product_id))
        .await
        .map_err(|e| e.user_message())?;

    info!(product_id = %product_id, "Product deleted");
    Ok(())
}

/// List all orders.
///
/// # Errors
///
/// Returns an error if not logged in or the backend rejects the call.
pub async fn orders() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    let orders = state
        .api()
        .list_orders(&token)
        .await
        .map_err(|e| e.user_message())?;

    for order in &orders {
        info!(
            total = %order.total_price,
            paid = order.is_paid,
            delivered = order.is_delivered,
            "  {}",
            order.id
        );
    }
    Ok(())
}

/// Mark an order delivered.
///
/// # Errors
///
/// Returns an error if not logged in or the backend rejects the call.
pub async fn deliver(order_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    let order = state
        .api()
        .deliver_order(&token, &OrderId::new(order_id))
        .await
        .map_err(|e| e.user_message())?;

    info!(order_id = %order.id, delivered = order.is_delivered, "Order delivered");
    Ok(())
}

/// List all users.
///
/// # Errors
///
/// Returns an error if not logged in or the backend rejects the call.
pub async fn users() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    let users = state
        .api()
        .list_users(&token)
        .await
        .map_err(|e| e.user_message())?;

    for user in &users {
        info!(email = %user.email, admin = user.is_admin, "  {} ({})", user.name, user.id);
    }
    Ok(())
}

/// Delete a user.
///
/// # Errors
///
/// Returns an error if not logged in or the backend rejects the call.
pub async fn user_delete(user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    state
        .api()
        .delete_user(&token, &UserId::new(user_id))
        .await
        .map_err(|e| e.user_message())?;

    info!(user_id = %user_id, "User deleted");
    Ok(())
}

fn parse_price(raw: &str) -> Result<Decimal, Box<dyn std::error::Error>> {
    Decimal::from_str(raw).map_err(|e| format!("Invalid --price: {e}").into())
}
