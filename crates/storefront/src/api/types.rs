//! Request and response payloads for the backend REST API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{OrderItem, PaymentMethod, Product, ProductPage, ShippingAddress};

/// Error payload the backend attaches to non-success responses.
///
/// The `message` field is not always present; absence falls back to a
/// generic display string.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for `POST /users/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for the registration endpoints.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Partial update for `PUT /users/profile`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Body for `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_price: Decimal,
}

/// Body for `POST /products/:id/reviews`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateReviewRequest {
    pub rating: f32,
    pub comment: String,
}

/// Partial product data for the admin create/update endpoints.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_in_stock: Option<u32>,
}

/// The product list endpoint returns either a paginated envelope or a bare
/// array depending on backend version; both normalize to [`ProductPage`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductListResponse {
    Page(ProductPage),
    Bare(Vec<Product>),
}

impl From<ProductListResponse> for ProductPage {
    fn from(response: ProductListResponse) -> Self {
        match response {
            ProductListResponse::Page(page) => page,
            ProductListResponse::Bare(products) => Self {
                products,
                page: 1,
                pages: 1,
            },
        }
    }
}
