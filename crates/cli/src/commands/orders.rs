//! Order history commands.

use tracing::info;

use clementine_core::{OrderId, PaymentResult};

use super::{app_state, auth_token};

/// List the logged-in user's orders.
///
/// # Errors
///
/// Returns an error if not logged in or the call fails.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    let orders = state
        .api()
        .my_orders(&token)
        .await
        .map_err(|e| e.user_message())?;

    if orders.is_empty() {
        info!("No orders yet");
        return Ok(());
    }

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

/// Show one order in detail.
///
/// # Errors
///
/// Returns an error if not logged in, the order is not found, or the
/// call fails.
pub async fn show(order_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    let order = state
        .api()
        .get_order(&token, &OrderId::new(order_id))
        .await
        .map_err(|e| e.user_message())?;

    info!(
        total = %order.total_price,
        method = %order.payment_method,
        paid = order.is_paid,
        delivered = order.is_delivered,
        cancelled = order.is_cancelled,
        "Order {}",
        order.id
    );
    for item in &order.order_items {
        info!(qty = item.qty, price = %item.price, "  {}", item.name);
    }
    Ok(())
}

/// Record a completed gateway payment against an order.
///
/// # Errors
///
/// Returns an error if not logged in or the call fails.
pub async fn pay(order_id: &str, payment_id: String) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    let order = state
        .api()
        .pay_order(
            &token,
            &OrderId::new(order_id),
            &PaymentResult {
                id: payment_id,
                status: "COMPLETED".to_string(),
                update_time: None,
                email_address: None,
            },
        )
        .await
        .map_err(|e| e.user_message())?;

    info!(order_id = %order.id, paid = order.is_paid, "Payment recorded");
    Ok(())
}

/// Cancel an order.
///
/// # Errors
///
/// Returns an error if not logged in or the call fails.
pub async fn cancel(order_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let token = auth_token(&state)?;

    let order = state
        .api()
        .cancel_order(&token, &OrderId::new(order_id))
        .await
        .map_err(|e| e.user_message())?;

    info!(order_id = %order.id, cancelled = order.is_cancelled, "Order cancelled");
    Ok(())
}
