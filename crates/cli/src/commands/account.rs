//! Account commands: login, registration, logout, profile.

use tracing::info;

use clementine_storefront::api::types::ProfileUpdate;

use super::{app_state, auth_token};

/// Log in and reconcile the cart with the user's saved state.
///
/// # Errors
///
/// Returns an error if the credentials are rejected or the call fails.
pub async fn login(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let user = state
        .session()
        .login(email, password)
        .await
        .map_err(|e| e.user_message())?;

    info!(name = %user.name, "Logged in");
    let items = state.cart().items();
    if !items.is_empty() {
        info!(count = items.len(), "Cart restored");
    }
    Ok(())
}

/// Create an account and log in as it.
///
/// # Errors
///
/// Returns an error if registration fails on every route.
pub async fn register(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let user = state
        .session()
        .register(name, email, password)
        .await
        .map_err(|e| e.user_message())?;

    info!(name = %user.name, email = %user.email, "Account created");
    Ok(())
}

/// Log out, preserving the cart for the next login.
///
/// # Errors
///
/// Returns an error only if configuration loading fails.
pub fn logout() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    state.session().logout();
    info!("Logged out");
    Ok(())
}

/// Fetch and display the current profile.
///
/// # Errors
///
/// Returns an error if not logged in or the call fails.
pub async fn profile() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    auth_token(&state)?;

    let user = state
        .session()
        .get_profile()
        .await
        .map_err(|e| e.user_message())?;

    info!(name = %user.name, email = %user.email, admin = user.is_admin, "Profile");
    Ok(())
}

/// Update the current profile.
///
/// # Errors
///
/// Returns an error if not logged in or the update is rejected.
pub async fn update(
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if name.is_none() && email.is_none() && password.is_none() {
        return Err("Nothing to update: pass --name, --email, or --password".into());
    }

    let state = app_state()?;
    auth_token(&state)?;

    let user = state
        .session()
        .update_profile(&ProfileUpdate {
            name,
            email,
            password,
        })
        .await
        .map_err(|e| e.user_message())?;

    info!(name = %user.name, email = %user.email, "Profile updated");
    Ok(())
}
