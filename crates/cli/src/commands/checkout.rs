//! Checkout commands.
//!
//! The wizard steps map onto subcommands: `shipping`, `payment`, `submit`.
//! Each invocation re-enters the flow, which resumes at the first
//! incomplete step, so the three commands can be run across separate
//! processes against the same store file.

use tracing::info;

use clementine_core::{PaymentMethod, ShippingAddress};

use super::app_state;

/// Save the shipping address (checkout step one).
///
/// # Errors
///
/// Returns an error if checkout cannot start or a field is blank.
pub fn shipping(
    address: String,
    city: String,
    postal_code: String,
    country: String,
    phone: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let flow = state.begin_checkout().map_err(|e| e.user_message())?;

    flow.submit_shipping(ShippingAddress {
        address,
        city,
        postal_code,
        country,
        phone_number: phone,
    })
    .map_err(|e| e.user_message())?;

    info!("Shipping address saved");
    Ok(())
}

/// Choose the payment method (checkout step two).
///
/// # Errors
///
/// Returns an error if checkout cannot start or shipping is missing.
pub fn payment(method: PaymentMethod) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let flow = state.begin_checkout().map_err(|e| e.user_message())?;

    flow.submit_payment(method).map_err(|e| e.user_message())?;
    info!(method = %method, "Payment method saved");
    Ok(())
}

/// Review totals and place the order (checkout step three).
///
/// # Errors
///
/// Returns an error if prior steps are incomplete or the backend
/// rejects the order.
pub async fn submit() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let flow = state.begin_checkout().map_err(|e| e.user_message())?;

    // Re-assert the saved payment method to advance the resumed flow to
    // the review step.
    flow.submit_payment(state.cart().payment_method())
        .map_err(|e| e.user_message())?;

    let totals = flow.totals();
    info!(
        subtotal = %totals.subtotal,
        shipping = %totals.shipping,
        tax = %totals.tax,
        total = %totals.total,
        "Placing order"
    );

    let order = flow.submit().await.map_err(|e| e.user_message())?;
    info!(order_id = %order.id, total = %order.total_price, "Order placed");
    Ok(())
}
