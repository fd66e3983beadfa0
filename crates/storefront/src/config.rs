//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_API_URL` - Base URL of the backend REST API
//!   (e.g., `https://api.example.com/api`)
//!
//! ## Optional
//! - `CLEMENTINE_STORE_PATH` - Path of the durable key-value store file
//!   (default: `clementine-store.json`)
//! - `CHECKOUT_FREE_SHIPPING_THRESHOLD` - Subtotal at or above which
//!   shipping is free (default: 500)
//! - `CHECKOUT_FLAT_SHIPPING_FEE` - Flat shipping fee below the threshold
//!   (default: 10)
//! - `CHECKOUT_TAX_RATE` - Tax as a fraction of the subtotal (default: 0.1)

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API configuration.
    pub backend: BackendConfig,
    /// Path of the durable key-value store file.
    pub store_path: PathBuf,
    /// Checkout pricing parameters.
    pub pricing: CheckoutPricing,
}

/// Backend REST API configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend API, without trailing slash.
    pub base_url: String,
}

/// Pricing parameters used by the checkout review step.
///
/// The backend re-validates totals server-side; these only drive what the
/// client computes and displays.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutPricing {
    /// Subtotal at or above which shipping is free.
    pub free_shipping_threshold: Decimal,
    /// Flat shipping fee charged below the threshold.
    pub flat_shipping_fee: Decimal,
    /// Tax as a fraction of the subtotal.
    pub tax_rate: Decimal,
}

impl Default for CheckoutPricing {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::from(500),
            flat_shipping_fee: Decimal::from(10),
            tax_rate: Decimal::new(1, 1), // 0.1
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig::from_env()?;
        let store_path =
            PathBuf::from(get_env_or_default("CLEMENTINE_STORE_PATH", "clementine-store.json"));
        let pricing = CheckoutPricing::from_env()?;

        Ok(Self {
            backend,
            store_path,
            pricing,
        })
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("BACKEND_API_URL")?;
        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_API_URL".to_string(), e.to_string()))?;

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }
}

impl CheckoutPricing {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            free_shipping_threshold: get_decimal_or_default(
                "CHECKOUT_FREE_SHIPPING_THRESHOLD",
                "500",
            )?,
            flat_shipping_fee: get_decimal_or_default("CHECKOUT_FLAT_SHIPPING_FEE", "10")?,
            tax_rate: get_decimal_or_default("CHECKOUT_TAX_RATE", "0.1")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a decimal environment variable with a default value.
fn get_decimal_or_default(key: &str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = get_env_or_default(key, default);
    Decimal::from_str(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_pricing_defaults() {
        let pricing = CheckoutPricing::default();
        assert_eq!(pricing.free_shipping_threshold, dec!(500));
        assert_eq!(pricing.flat_shipping_fee, dec!(10));
        assert_eq!(pricing.tax_rate, dec!(0.1));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let url = Url::parse("https://api.example.com/api/").unwrap();
        assert_eq!(
            url.as_str().trim_end_matches('/'),
            "https://api.example.com/api"
        );
    }

    #[test]
    fn test_missing_env_var_error_display() {
        let err = ConfigError::MissingEnvVar("BACKEND_API_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: BACKEND_API_URL"
        );
    }
}
