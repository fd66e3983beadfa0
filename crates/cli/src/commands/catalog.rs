//! Catalog commands.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::info;

use clementine_core::{ProductFilters, ProductId};

use clementine_storefront::api::types::CreateReviewRequest;

use super::{app_state, auth_token};

/// List products, optionally filtered.
///
/// # Errors
///
/// Returns an error if a price filter fails to parse or the call fails.
pub async fn list(
    keyword: Option<String>,
    category: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filters = ProductFilters {
        keyword,
        category,
        min_price: parse_price("--min-price", min_price)?,
        max_price: parse_price("--max-price", max_price)?,
        min_rating: None,
    };

    let state = app_state()?;
    let page = state
        .api()
        .list_products(&filters)
        .await
        .map_err(|e| e.user_message())?;

    if page.products.is_empty() {
        info!("No products found");
        return Ok(());
    }

    for product in &page.products {
        info!(
            price = %product.price,
            stock = product.count_in_stock,
            "  {} ({})",
            product.name,
            product.id
        );
    }
    info!(page = page.page, pages = page.pages, "Page");
    Ok(())
}

/// Show one product in detail.
///
/// # Errors
///
/// Returns an error if the product is not found or the call fails.
pub async fn show(product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let product = state
        .api()
        .get_product(&ProductId::new(product_id))
        .await
        .map_err(|e| e.user_message())?;

    info!(
        price = %product.price,
        stock = product.count_in_stock,
        brand = product.brand.as_deref().unwrap_or("-"),
        "{}",
        product.name
    );
    if !product.description.is_empty() {
        info!("{}", product.description);
    }
    for review in &product.reviews {
        info!(rating = review.rating, "  {}: {}", review.name, review.comment);
    }
    Ok(())
}

/// List product categories.
///
/// # Errors
///
/// Returns an error if the call fails.
pub async fn categories() -> Result<(), Box<dyn std::error::Error>> {
    let state = app_state()?;
    let categories = state
        .api()
        .list_categories()
        .await
        .map_err(|e| e.user_message())?;

    if categories.is_empty() {
        info!("No categories");
        return Ok(());
    }
    for category in &categories {
        info!("  {} ({})", category.name, category.id);
    }
    Ok(())
}

/// Post a review on a product.
///
/// # Errors
///
/// Returns an error if not logged in or the review is rejected.
pub async fn review(
    product_id: &str,
    rating: f32,
    comment: String,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(1.0..=5.0).contains(&rating) {
        return Err("Rating must be between 1 and 5".into());
    }

    let state = app_state()?;
    let token = auth_token(&state)?;

    state
        .api()
        .create_review(
            &token,
            &ProductId::new(product_id),
            &CreateReviewRequest { rating, comment },
        )
        .await
        .map_err(|e| e.user_message())?;

    info!("Review posted");
    Ok(())
}

fn parse_price(
    flag: &str,
    raw: Option<String>,
) -> Result<Option<Decimal>, Box<dyn std::error::Error>> {
    raw.map(|value| {
        Decimal::from_str(&value).map_err(|e| format!("Invalid {flag}: {e}").into())
    })
    .transpose()
}
