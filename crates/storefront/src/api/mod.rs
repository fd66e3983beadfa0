//! Backend REST API client.
//!
//! The backend is a black-box HTTP service owning all business logic.
//! This module wraps it in a typed client; catalog reads are cached with
//! `moka` (5-minute TTL), mutable endpoints are never cached.
//!
//! Authenticated calls carry a bearer token sourced from the persisted
//! session user; the client itself is stateless with respect to identity.

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use clementine_core::{
    Category, Order, OrderId, Product, ProductFilters, ProductId, ProductPage, SessionUser, UserId,
};

use crate::config::BackendConfig;
use cache::CacheValue;
use types::{
    CreateOrderRequest, CreateReviewRequest, ErrorBody, LoginRequest, ProductInput,
    ProductListResponse, ProfileUpdate, RegisterRequest,
};

/// Registration endpoints, tried in order until one succeeds.
///
/// Some backend deployments expose account creation at `/users`, others at
/// `/users/register`; the fallback is only attempted when the primary call
/// itself fails.
const REGISTER_ROUTES: &[&str] = &["/users", "/users/register"];

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend error (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Backend {
        status: u16,
        /// Server-provided `message` field, when present.
        message: Option<String>,
    },

    /// The response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Human-readable message suitable for display to the user.
    ///
    /// Prefers the server-provided message; falls back to a generic string.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Backend { status, .. } => {
                format!("The store backend rejected the request (HTTP {status})")
            }
            Self::Http(_) => "Could not reach the store backend".to_string(),
            Self::Parse(_) => "The store backend sent an unexpected response".to_string(),
        }
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the backend REST API.
///
/// Cheaply cloneable; catalog reads share one in-memory cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl BackendClient {
    /// Create a new backend API client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Decode a response, mapping non-success statuses to `ApiError::Backend`
    /// with the server's `message` field when one is present.
    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.message);
            debug!(status = %status, "backend returned non-success status");
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the call fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("/users/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Create an account, trying each registration route in order.
    ///
    /// # Errors
    ///
    /// Returns the last route's error if every candidate route fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ApiError> {
        let mut last_error = None;

        for route in REGISTER_ROUTES {
            let result = async {
                let response = self
                    .inner
                    .client
                    .post(self.url(route))
                    .json(&RegisterRequest {
                        name,
                        email,
                        password,
                    })
                    .send()
                    .await?;
                Self::handle::<SessionUser>(response).await
            }
            .await;

            match result {
                Ok(user) => return Ok(user),
                Err(e) => {
                    debug!(route = %route, error = %e, "registration route failed");
                    last_error = Some(e);
                }
            }
        }

        // REGISTER_ROUTES is non-empty, so at least one error was recorded.
        Err(last_error.unwrap_or(ApiError::Backend {
            status: 0,
            message: None,
        }))
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the call fails.
    #[instrument(skip(self, token))]
    pub async fn get_profile(&self, token: &str) -> Result<SessionUser, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("/users/profile"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Update the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the call fails.
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<SessionUser, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url("/users/profile"))
            .bearer_auth(token)
            .json(update)
            .send()
            .await?;

        Self::handle(response).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get a product by id. Used to hydrate a cart item from id + quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the call fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response = self
            .inner
            .client
            .get(self.url(&format!("/products/{product_id}")))
            .send()
            .await?;

        let product: Product = Self::handle(response).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the product list, optionally filtered.
    ///
    /// Only the unfiltered list is cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, filters))]
    pub async fn list_products(&self, filters: &ProductFilters) -> Result<ProductPage, ApiError> {
        let query = filters.to_query();
        let cache_key = "products:default".to_string();

        if query.is_empty()
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let response = self
            .inner
            .client
            .get(self.url("/products"))
            .query(&query)
            .send()
            .await?;

        let page: ProductPage = Self::handle::<ProductListResponse>(response).await?.into();

        if query.is_empty() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get all product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let response = self.inner.client.get(self.url("/categories")).send().await?;
        let categories: Vec<Category> = Self::handle(response).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Post a review on a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the review is rejected or the call fails.
    #[instrument(skip(self, token, review), fields(product_id = %product_id))]
    pub async fn create_review(
        &self,
        token: &str,
        product_id: &ProductId,
        review: &CreateReviewRequest,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url(&format!("/products/{product_id}/reviews")))
            .bearer_auth(token)
            .json(review)
            .send()
            .await?;

        let _: serde_json::Value = Self::handle(response).await?;
        self.invalidate_product(product_id).await;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit a new order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is rejected or the call fails.
    #[instrument(skip(self, token, request))]
    pub async fn create_order(
        &self,
        token: &str,
        request: &CreateOrderRequest,
    ) -> Result<Order, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("/orders"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the call fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn get_order(&self, token: &str, order_id: &OrderId) -> Result<Order, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("/orders/{order_id}")))
            .bearer_auth(token)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Record a payment result against an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token, payment), fields(order_id = %order_id))]
    pub async fn pay_order(
        &self,
        token: &str,
        order_id: &OrderId,
        payment: &clementine_core::PaymentResult,
    ) -> Result<Order, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(&format!("/orders/{order_id}/pay")))
            .bearer_auth(token)
            .json(payment)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Mark an order delivered (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn deliver_order(&self, token: &str, order_id: &OrderId) -> Result<Order, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(&format!("/orders/{order_id}/deliver")))
            .bearer_auth(token)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, token: &str, order_id: &OrderId) -> Result<Order, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(&format!("/orders/{order_id}/cancel")))
            .bearer_auth(token)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Get the authenticated user's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("/orders/myorders"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Get all orders (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("/orders"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::handle(response).await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token, input))]
    pub async fn create_product(
        &self,
        token: &str,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("/products"))
            .bearer_auth(token)
            .json(input)
            .send()
            .await?;

        let product: Product = Self::handle(response).await?;
        self.invalidate_product_list().await;
        Ok(product)
    }

    /// Update a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token, input), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        token: &str,
        product_id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(&format!("/products/{product_id}")))
            .bearer_auth(token)
            .json(input)
            .send()
            .await?;

        let product: Product = Self::handle(response).await?;
        self.invalidate_product(product_id).await;
        self.invalidate_product_list().await;
        Ok(product)
    }

    /// Delete a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn delete_product(&self, token: &str, product_id: &ProductId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("/products/{product_id}")))
            .bearer_auth(token)
            .send()
            .await?;

        let _: serde_json::Value = Self::handle(response).await?;
        self.invalidate_product(product_id).await;
        self.invalidate_product_list().await;
        Ok(())
    }

    /// List all users (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token))]
    pub async fn list_users(&self, token: &str) -> Result<Vec<SessionUser>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("/users"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Delete a user (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn delete_user(&self, token: &str, user_id: &UserId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("/users/{user_id}")))
            .bearer_auth(token)
            .send()
            .await?;

        let _: serde_json::Value = Self::handle(response).await?;
        Ok(())
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, product_id: &ProductId) {
        self.inner
            .cache
            .invalidate(&format!("product:{product_id}"))
            .await;
    }

    /// Invalidate the cached default product list.
    pub async fn invalidate_product_list(&self) {
        self.inner.cache.invalidate(&"products:default".to_string()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = ApiError::Backend {
            status: 401,
            message: Some("Invalid email or password".to_string()),
        };
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_user_message_generic_fallback() {
        let err = ApiError::Backend {
            status: 500,
            message: None,
        };
        assert_eq!(
            err.user_message(),
            "The store backend rejected the request (HTTP 500)"
        );
    }

    #[test]
    fn test_backend_error_display() {
        let err = ApiError::Backend {
            status: 404,
            message: Some("Order not found".to_string()),
        };
        assert_eq!(err.to_string(), "Backend error (HTTP 404): Order not found");
    }

    #[test]
    fn test_register_routes_order() {
        // The primary route must be attempted before the fallback.
        assert_eq!(REGISTER_ROUTES, &["/users", "/users/register"]);
    }
}
