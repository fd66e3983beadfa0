//! Cart commands.

use tracing::info;

use clementine_core::ProductId;
use clementine_storefront::checkout::OrderTotals;

use super::app_state;

/// Add a product to the cart, or set its quantity if already present.
///
/// # Errors
///
/// Returns an error if the product lookup fails or it is out of stock.
pub async fn add(product_id: &str, qty: u32) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let product = state
        .api()
        .get_product(&ProductId::new(product_id))
        .await
        .map_err(|e| e.user_message())?;

    let name = product.name.clone();
    state
        .cart()
        .add_or_update(product.into_cart_item(qty))
        .map_err(|e| e.to_string())?;

    info!(product = %name, "Added to cart");
    show_items(&state);
    Ok(())
}

/// Remove a product from the cart.
///
/// # Errors
///
/// Returns an error only if configuration loading fails.
pub fn remove(product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    state.cart().remove(&ProductId::new(product_id));
    show_items(&state);
    Ok(())
}

/// Show the cart contents with totals.
///
/// # Errors
///
/// Returns an error only if configuration loading fails.
pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    show_items(&state);

    if let Some(address) = state.cart().shipping_address() {
        info!(city = %address.city, country = %address.country, "Shipping to");
    }
    info!(method = %state.cart().payment_method(), "Paying with");
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error only if configuration loading fails.
pub fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    state.cart().clear();
    info!("Cart cleared");
    Ok(())
}

fn show_items(state: &clementine_storefront::state::AppState) {
    let items = state.cart().items();
    if items.is_empty() {
        info!("Cart is empty");
        return;
    }

    for item in &items {
        info!(
            qty = item.qty,
            price = %item.price,
            "  {} ({})",
            item.name,
            item.product_id
        );
    }

    let totals = OrderTotals::compute(&items, &state.config().pricing);
    info!(
        subtotal = %totals.subtotal,
        shipping = %totals.shipping,
        tax = %totals.tax,
        total = %totals.total,
        "Totals"
    );
}
