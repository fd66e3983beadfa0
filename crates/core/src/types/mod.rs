//! Shared domain types.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod order;
pub mod user;

pub use cart::{CartItem, PaymentMethod, ShippingAddress};
pub use catalog::{Category, Product, ProductFilters, ProductPage, Review};
pub use id::{CategoryId, OrderId, ProductId, UserId};
pub use order::{Order, OrderItem, PaymentResult};
pub use user::SessionUser;
