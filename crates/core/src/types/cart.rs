//! Cart-related types.
//!
//! A cart is an ordered list of [`CartItem`]s with at most one entry per
//! product id. Items snapshot the product at the time of add; the backend
//! remains the source of truth for live pricing and stock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A product snapshot plus the requested quantity.
///
/// Identity key is the product id: re-adding the same product replaces the
/// existing entry rather than appending a second one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Backend product id.
    #[serde(rename = "_id")]
    pub product_id: ProductId,
    /// Product display name at time of add.
    pub name: String,
    /// Product image URL.
    pub image: String,
    /// Unit price at time of add.
    pub price: Decimal,
    /// Stock count at time of add. Upper bound for `qty`.
    pub count_in_stock: u32,
    /// Requested quantity, always in `1..=count_in_stock`.
    pub qty: u32,
}

/// Shipping address collected during checkout.
///
/// Plain strings; the only invariant is that every field is non-empty
/// before checkout can advance past the shipping step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone_number: String,
}

impl ShippingAddress {
    /// Whether every field has been filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.address.trim().is_empty()
            && !self.city.trim().is_empty()
            && !self.postal_code.trim().is_empty()
            && !self.country.trim().is_empty()
            && !self.phone_number.trim().is_empty()
    }
}

/// Payment method selection.
///
/// Closed enumeration; serialized with the wire labels the backend expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// PayPal or card via the PayPal gateway. The default selection.
    #[default]
    PayPal,
    /// Direct credit card payment.
    CreditCard,
    /// Cash on delivery.
    #[serde(rename = "COD")]
    CashOnDelivery,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PayPal => write!(f, "PayPal"),
            Self::CreditCard => write!(f, "CreditCard"),
            Self::CashOnDelivery => write!(f, "COD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn item() -> CartItem {
        CartItem {
            product_id: ProductId::new("p-1"),
            name: "Espresso Grinder".to_string(),
            image: "/images/grinder.jpg".to_string(),
            price: dec!(129.99),
            count_in_stock: 5,
            qty: 2,
        }
    }

    #[test]
    fn test_cart_item_wire_format() {
        let json = serde_json::to_value(item()).expect("serialize");
        assert_eq!(json["_id"], "p-1");
        assert_eq!(json["countInStock"], 5);
        assert_eq!(json["qty"], 2);
    }

    #[test]
    fn test_shipping_address_completeness() {
        let mut addr = ShippingAddress {
            address: "12 Rue des Fleurs".to_string(),
            city: "Lyon".to_string(),
            postal_code: "69001".to_string(),
            country: "France".to_string(),
            phone_number: "+33 4 00 00 00 00".to_string(),
        };
        assert!(addr.is_complete());

        addr.postal_code = "   ".to_string();
        assert!(!addr.is_complete());

        assert!(!ShippingAddress::default().is_complete());
    }

    #[test]
    fn test_payment_method_wire_labels() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::PayPal).expect("serialize"),
            "\"PayPal\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).expect("serialize"),
            "\"COD\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"COD\"").expect("deserialize");
        assert_eq!(parsed, PaymentMethod::CashOnDelivery);
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::PayPal);
    }
}
