//! Catalog types: products, reviews, categories, and list filters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::cart::CartItem;
use crate::types::id::{CategoryId, ProductId};

/// A customer review attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub rating: f32,
    pub comment: String,
    /// Id of the authoring user.
    pub user: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A product as returned by the backend catalog endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: u32,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub num_reviews: Option<u32>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Snapshot this product into a cart item with the given quantity.
    ///
    /// The quantity is not clamped here; the cart store owns that invariant.
    #[must_use]
    pub fn into_cart_item(self, qty: u32) -> CartItem {
        CartItem {
            product_id: self.id,
            name: self.name,
            image: self.image,
            price: self.price,
            count_in_stock: self.count_in_stock,
            qty,
        }
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Query filters for the product list endpoint.
///
/// All fields optional; absent fields are omitted from the query string.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<f32>,
}

impl ProductFilters {
    /// Render the filters as query-string pairs.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(keyword) = &self.keyword {
            params.push(("keyword", keyword.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(min_price) = self.min_price {
            params.push(("minPrice", min_price.to_string()));
        }
        if let Some(max_price) = self.max_price {
            params.push(("maxPrice", max_price.to_string()));
        }
        if let Some(min_rating) = self.min_rating {
            params.push(("minRating", min_rating.to_string()));
        }
        params
    }
}

/// A page of products from the list endpoint.
///
/// The backend returns either a bare array or a paginated envelope; the
/// API client normalizes both into this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page")]
    pub pages: u32,
}

const fn default_page() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_product_into_cart_item_snapshots_fields() {
        let product = Product {
            id: ProductId::new("p-7"),
            name: "Pour-over Kettle".to_string(),
            image: "/images/kettle.jpg".to_string(),
            brand: Some("Hario".to_string()),
            category: None,
            description: String::new(),
            price: dec!(45),
            count_in_stock: 3,
            rating: None,
            num_reviews: None,
            reviews: Vec::new(),
        };

        let item = product.into_cart_item(2);
        assert_eq!(item.product_id, ProductId::new("p-7"));
        assert_eq!(item.price, dec!(45));
        assert_eq!(item.count_in_stock, 3);
        assert_eq!(item.qty, 2);
    }

    #[test]
    fn test_filters_to_query_skips_absent_fields() {
        let filters = ProductFilters {
            keyword: Some("kettle".to_string()),
            min_price: Some(dec!(10)),
            ..ProductFilters::default()
        };
        let query = filters.to_query();
        assert_eq!(
            query,
            vec![
                ("keyword", "kettle".to_string()),
                ("minPrice", "10".to_string())
            ]
        );
        assert!(ProductFilters::default().to_query().is_empty());
    }
}
