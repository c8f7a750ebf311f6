//! WhatsApp order handoff.
//!
//! Checkout composes a plain-text order summary and sends the shopper to a
//! `wa.me` link with the message pre-filled. No order is recorded and the cart
//! is left as it was.

use std::fmt::Write as _;

use asthmi_core::{Cart, Money};
use serde::Deserialize;
use thiserror::Error;

/// Why an order cannot be handed off.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,
    #[error("Please fill in your details to proceed.")]
    MissingDetails(Vec<&'static str>),
}

/// Delivery details entered on the cart page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub pincode: String,
}

impl DeliveryDetails {
    /// Trim every field and require name, phone and address.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingDetails` listing the blank required fields.
    pub fn validate(self) -> Result<Self, CheckoutError> {
        let details = Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
        };

        let missing: Vec<&'static str> = [
            ("name", &details.name),
            ("phone", &details.phone),
            ("address", &details.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(details)
        } else {
            Err(CheckoutError::MissingDetails(missing))
        }
    }
}

/// A composed order message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMessage {
    text: String,
    total: Money,
}

impl OrderMessage {
    /// Compose the message for `cart` and validated `details`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    pub fn compose(
        store_name: &str,
        cart: &Cart,
        details: &DeliveryDetails,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total = cart.total();
        let mut text = format!("*New Order from {store_name}*\n\n*Items:*\n");
        for item in cart.items() {
            let _ = write!(text, "{}", item.name);
            if let Some(size) = &item.selected_size {
                let _ = write!(text, " [{size}]");
            }
            let _ = writeln!(text, " (x{}) - {}", item.quantity, item.line_total());
        }
        let _ = write!(
            text,
            "\n*Total:* {total}\n\n*Customer Details:*\nName: {}\nPhone: {}\nAddress: {}, {} - {}",
            details.name, details.phone, details.address, details.city, details.pincode
        );

        Ok(Self { text, total })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// The `wa.me` link that opens a chat with this message pre-filled.
    #[must_use]
    pub fn whatsapp_url(&self, order_number: &str) -> String {
        format!(
            "https://wa.me/{order_number}?text={}",
            urlencoding::encode(&self.text)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use asthmi_core::{Product, ProductRecord, VariantRecord};
    use rust_decimal::Decimal;

    use super::*;

    fn details() -> DeliveryDetails {
        DeliveryDetails {
            name: " Ravi ".to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            pincode: "411001".to_string(),
        }
    }

    fn cart() -> Cart {
        let kumkum = Product::try_from(ProductRecord {
            id: Some("kumkum".to_string()),
            name: Some("Kumkum".to_string()),
            price: Some(Decimal::from(45)),
            ..ProductRecord::default()
        })
        .unwrap();
        let ghee = Product::try_from(ProductRecord {
            id: Some("ghee".to_string()),
            name: Some("Ghee".to_string()),
            price: Some(Decimal::from(300)),
            variants: Some(vec![VariantRecord {
                id: Some("500g".to_string()),
                name: Some("500 g".to_string()),
                price: Some(Decimal::from(550)),
                ..VariantRecord::default()
            }]),
            ..ProductRecord::default()
        })
        .unwrap();

        let mut cart = Cart::new();
        cart.add(&kumkum, 2, None);
        cart.add(&ghee, 1, ghee.variants.first());
        cart
    }

    #[test]
    fn test_message_format() {
        let details = details().validate().unwrap();
        let message = OrderMessage::compose("Ashok Asthmi", &cart(), &details).unwrap();

        assert_eq!(
            message.text(),
            "*New Order from Ashok Asthmi*\n\n\
             *Items:*\n\
             Kumkum (x2) - ₹90\n\
             Ghee [500 g] (x1) - ₹550\n\
             \n*Total:* ₹640\n\n\
             *Customer Details:*\n\
             Name: Ravi\n\
             Phone: 9876543210\n\
             Address: 12 MG Road, Pune - 411001"
        );
        assert_eq!(message.total(), Money::from_rupees(640));
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let details = details().validate().unwrap();
        assert_eq!(
            OrderMessage::compose("Ashok Asthmi", &Cart::new(), &details),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_missing_details_are_listed() {
        let details = DeliveryDetails {
            name: "  ".to_string(),
            address: "12 MG Road".to_string(),
            ..DeliveryDetails::default()
        };

        let err = details.validate().unwrap_err();
        assert_eq!(err, CheckoutError::MissingDetails(vec!["name", "phone"]));
        assert_eq!(err.to_string(), "Please fill in your details to proceed.");
    }

    #[test]
    fn test_city_and_pincode_are_optional() {
        let details = DeliveryDetails {
            city: String::new(),
            pincode: String::new(),
            ..details()
        };
        assert!(details.validate().is_ok());
    }

    #[test]
    fn test_whatsapp_url_encodes_message() {
        let details = details().validate().unwrap();
        let message = OrderMessage::compose("Ashok Asthmi", &cart(), &details).unwrap();
        let url = message.whatsapp_url("910000000000");

        assert!(url.starts_with("https://wa.me/910000000000?text=%2ANew%20Order%20from%20Ashok%20Asthmi%2A%0A%0A"));
        assert!(url.contains("%E2%82%B9640"));
        assert!(!url.contains(' '));
    }
}
