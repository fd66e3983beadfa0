//! CLI command implementations.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use clementine_storefront::config::StorefrontConfig;
use clementine_storefront::state::AppState;

/// Build application state from the environment.
///
/// Every command goes through here so the store file and backend URL are
/// resolved the same way regardless of entry point.
pub fn app_state() -> Result<AppState, Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    Ok(AppState::new(config))
}

/// The bearer token of the logged-in user, if any.
pub fn auth_token(state: &AppState) -> Result<String, Box<dyn std::error::Error>> {
    state
        .session()
        .current_user()
        .and_then(|user| user.token)
        .ok_or_else(|| "You are not logged in".into())
}
