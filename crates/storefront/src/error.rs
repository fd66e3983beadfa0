//! Unified error type for the storefront.
//!
//! Each subsystem keeps its own error enum; this type exists so binaries
//! can bubble any of them through one `Result` and still produce a
//! user-facing message at the edge.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Any error the storefront can surface.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// Human-readable message suitable for display to the user.
    ///
    /// Delegates to the subsystem's `user_message` where one exists;
    /// configuration errors are shown as-is since they address the
    /// operator, not the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
            Self::Cart(e) => e.to_string(),
            Self::Session(e) => e.user_message(),
            Self::Checkout(e) => e.user_message(),
        }
    }
}
